mod photos;

pub use photos::{Photo, PhotoStore};
