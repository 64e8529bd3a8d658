pub mod annotator;
pub mod viewer;

#[cfg(test)]
pub(crate) mod mock;
