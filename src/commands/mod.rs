pub mod declaration;
pub mod device;
pub mod set;
pub mod sync;
