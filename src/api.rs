pub mod session;
pub mod swagger_main;
pub mod todo;

#[cfg(test)]
pub(crate) mod test_util;
