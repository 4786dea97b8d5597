pub mod corpus;
pub mod corpus_builder;
pub mod mapping;
pub mod providers;
pub mod remote;
pub mod resolver;
pub mod selection;
