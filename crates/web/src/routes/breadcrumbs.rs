//! Breadcrumb trails for dashboard pages.

/// One link in a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub path: String,
}

impl Crumb {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Build a trail from a request path.
///
/// Each segment links to the path up to and including it. Hyphenated
/// segments become title case (`create-project` is "Create Project"). A
/// numeric segment is an entity ID and shows `id_label` when one is given.
#[must_use]
pub fn trail(path: &str, id_label: Option<&str>) -> Vec<Crumb> {
    let mut crumbs = Vec::new();
    let mut prefix = String::new();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        prefix.push('/');
        prefix.push_str(segment);

        let label = if segment.chars().all(|c| c.is_ascii_digit()) {
            id_label.map_or_else(|| format!("#{segment}"), ToString::to_string)
        } else {
            humanize(segment)
        };
        crumbs.push(Crumb::new(label, prefix.clone()));
    }

    crumbs
}

fn humanize(segment: &str) -> String {
    segment
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_links_each_prefix() {
        let crumbs = trail("/dashboard/projects", None);
        assert_eq!(
            crumbs,
            vec![
                Crumb::new("Dashboard", "/dashboard"),
                Crumb::new("Projects", "/dashboard/projects"),
            ]
        );
    }

    #[test]
    fn test_trail_humanizes_hyphens() {
        let crumbs = trail("/dashboard/create-project", None);
        assert_eq!(crumbs.last().map(|c| c.label.as_str()), Some("Create Project"));
    }

    #[test]
    fn test_trail_labels_ids() {
        let crumbs = trail("/dashboard/projects/42/edit", Some("Website"));
        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Dashboard", "Projects", "Website", "Edit"]);
        assert_eq!(crumbs.get(2).map(|c| c.path.as_str()), Some("/dashboard/projects/42"));

        let crumbs = trail("/dashboard/projects/42", None);
        assert_eq!(crumbs.last().map(|c| c.label.as_str()), Some("#42"));
    }

    #[test]
    fn test_trail_root_is_empty() {
        assert!(trail("/", None).is_empty());
        assert!(trail("", None).is_empty());
    }
}
