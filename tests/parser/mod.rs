mod tests_arithmetic;
mod tests_recovery;
