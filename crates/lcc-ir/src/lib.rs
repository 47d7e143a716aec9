//! Intermediate representation for the libcall counting pass.
//!
//! A small, LLVM-flavoured IR: modules own functions and string constants,
//! functions own basic blocks, and blocks own instructions. Only calls and
//! invokes carry structure; every other instruction is opaque text that is
//! carried through untouched.

mod block;
mod builder;
mod error;
mod function;
mod instr;
mod module;
mod parser;
mod printer;
mod types;
mod value;

pub use block::*;
pub use builder::*;
pub use error::*;
pub use function::*;
pub use instr::*;
pub use module::*;
pub use parser::parse_module;
pub use types::*;
pub use value::*;
