/// Get list of supported MIME types
pub fn get_supported() -> Vec<String> {
	super::ALLRULES.supported().into_iter().map(String::from).collect()
}

/// Number of rules in the bundled database
pub fn rule_count() -> usize {
	super::ALLRULES.len()
}
