mod arena;
mod binary;
mod handle;
mod skeleton;

pub(crate) use arena::Arena;
pub(crate) use binary::{Annotation, Link, RawBinaryTree, Triple};
pub(crate) use handle::Handle;
pub(crate) use skeleton::{Probe, violation};
