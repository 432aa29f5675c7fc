pub mod compiler;
pub mod node;
pub mod operator;
pub mod spec;

pub use compiler::{MAX_DEPTH, compile, compile_predicates};
pub use node::{Condition, FilterNode, Operand, Term};
pub use operator::{Combinator, OperatorKind};
pub use spec::FilterSpec;
