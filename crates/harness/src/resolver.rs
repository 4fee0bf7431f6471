use browser_env::{parse_element_line, ElementId};

/// Drops everything outside printable ASCII and trims the result.
pub fn clean_text(text: &str) -> String {
    let printable: String = text.chars().filter(|c| (' '..='~').contains(c)).collect();
    printable.trim().to_string()
}

/// Finds the element whose label matches `text`, ignoring case.
///
/// An exact label match wins; otherwise the first label containing `text`.
pub fn find_element_id_by_text(tree: &str, text: &str) -> Option<ElementId> {
    let search = clean_text(&text.to_lowercase());
    if search.is_empty() {
        return None;
    }

    let mut partial = None;
    for line in tree.lines() {
        let Some(element) = parse_element_line(line) else {
            continue;
        };
        let label = clean_text(&element.label.to_lowercase());
        if label.is_empty() {
            continue;
        }
        if label == search {
            return Some(element.id);
        }
        if partial.is_none() && label.contains(&search) {
            partial = Some(element.id);
        }
    }
    partial
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
