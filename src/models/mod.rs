pub mod history;
pub mod user;

pub use history::{History, NewHistory};
pub use user::{CreateUser, NewUser, UpdateUser, User, UserDto, UserFields, UserFilter, UserLookup};
