mod common;
mod relationship;
mod sequence;
