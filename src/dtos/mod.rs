pub mod applicationdtos;
pub mod chatdtos;
pub mod leasedtos;
pub mod propertydtos;
pub mod rentdtos;
pub mod reviewdtos;
pub mod userdtos;
