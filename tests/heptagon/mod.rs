mod tests_heptagon;
