pub mod attachment;
pub mod aws;
pub mod dynamodb;
pub mod memory;
pub mod models;
pub mod s3;
pub mod store;
pub mod todo_access;

pub use attachment::*;
pub use aws::*;
pub use dynamodb::*;
pub use memory::*;
pub use models::*;
pub use s3::*;
pub use store::*;
pub use todo_access::*;
