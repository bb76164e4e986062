// fnstack: function stacks for AWS Lambda
//
// The library half of the `fnstack` binary: the example stack, writing the
// synthesized template to disk and packaging assets into zips.

pub mod example_stack;
pub mod package;
pub mod synth;

mod init;

pub use example_stack::ExampleStack;
pub use init::init_tracing;
