pub mod tensor_extensions;

pub use tensor_extensions::*;
