/// Escapes HTML metacharacters so stored text can never be interpreted
/// as markup by a browser.
///
/// The escaped set matches what the frontend expects: `& < > " ' /`.
pub fn html(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());

	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#x27;"),
			'/' => escaped.push_str("&#x2F;"),
			_ => escaped.push(c),
		}
	}

	escaped
}

#[cfg(test)]
mod test {
	use super::html;

	#[test]
	fn escapes_script_tags() {
		let escaped = html("<script>alert('xss')</script>");

		assert!(!escaped.contains('<'));
		assert!(!escaped.contains('>'));
		assert_eq!(
			escaped,
			"&lt;script&gt;alert(&#x27;xss&#x27;)&lt;&#x2F;script&gt;"
		);
	}

	#[test]
	fn escapes_every_metacharacter() {
		assert_eq!(html(r#"&<>"'/"#), "&amp;&lt;&gt;&quot;&#x27;&#x2F;");
	}

	#[test]
	fn leaves_plain_text_untouched() {
		assert_eq!(html("bonjour tout le monde"), "bonjour tout le monde");
	}
}
