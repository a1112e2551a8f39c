pub mod error;
pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use memory::{MemoryPostRepo, MemoryUserRepo};
pub use post_repo::PgPostRepo;
pub use user_repo::PgUserRepo;

use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
