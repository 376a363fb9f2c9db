pub mod account;
pub mod department;
pub mod device;
pub mod ip_address;

pub use account::{Admin, User, UserProfile};
pub use department::{Department, DepartmentWithDivisions, Division};
pub use device::{Asset, AssetRow, DeviceStatus};
pub use ip_address::{IpAddress, IpStats, IpStatus, IpWithDevice};
