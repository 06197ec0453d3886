mod tests_properties;
mod tests_reparse;
