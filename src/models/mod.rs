pub mod item;
pub mod list;
pub mod user;

pub use item::{TodoItem, TodoItemInput, UpdateItemInput};
pub use list::{TodoList, TodoListInput, UpdateListInput};
pub use user::{NewUser, UserCredentials};
