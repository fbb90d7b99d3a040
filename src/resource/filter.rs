use super::Resource;

/// Sentinel value of the category select that disables category filtering
pub const ALL_CATEGORIES: &str = "todos";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Exact(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Exact(value.to_string())
        }
    }

    /// Value to put back into the select
    pub fn as_str(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Exact(value) => value,
        }
    }

    fn matches(&self, category: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Exact(wanted) => category == Some(wanted.as_str()),
        }
    }
}

/// Search box + category select
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub search: String,
    pub category: CategoryFilter,
}

impl Filter {
    pub fn new(search: &str, category: &str) -> Self {
        Filter {
            search: search.to_string(),
            category: CategoryFilter::parse(category),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.category == CategoryFilter::All
    }

    /// Records matching both the search term and the category, in store order
    pub fn apply<'a, R: Resource>(&self, items: &'a [R]) -> Vec<&'a R> {
        let needle = self.search.trim().to_lowercase();

        items
            .iter()
            .filter(|item| self.category.matches(item.category()))
            .filter(|item| {
                needle.is_empty()
                    || item
                        .search_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Curso;
    use crate::test_utils::helpers::curso;

    fn cursos() -> Vec<Curso> {
        vec![
            curso(1, "Cejas y Pestañas", "Corto"),
            curso(2, "Colorimetría", "Técnico"),
            curso(3, "Peinados de Novia", "Corto"),
            curso(4, "Maquillaje Profesional", "Técnico"),
        ]
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let items = cursos();
        let filtered: Vec<Curso> = Filter::new("", "todos")
            .apply(&items)
            .into_iter()
            .cloned()
            .collect();

        assert_eq!(filtered, items);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let items = cursos();

        for term in ["MAQUILLAJE", "colori", "ñas", "técnico", "novia", "zzz"] {
            let filtered = Filter::new(term, "todos").apply(&items);
            let needle = term.to_lowercase();
            let contains = |c: &Curso| {
                c.search_fields()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&needle))
            };

            assert!(filtered.iter().all(|c| contains(*c)), "term {}", term);
            let excluded = items.iter().filter(|c| !filtered.contains(c));
            assert!(excluded.into_iter().all(|c| !contains(c)), "term {}", term);
        }
    }

    #[test]
    fn test_search_covers_syllabus() {
        let mut items = cursos();
        items[0].temario = "Diseño de cejas; Lifting".to_string();

        let filtered = Filter::new("lifting", "todos").apply(&items);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn test_category_is_exact_match() {
        let items = cursos();

        let ids: Vec<i64> = Filter::new("", "Corto")
            .apply(&items)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);

        assert!(Filter::new("", "corto").apply(&items).is_empty());
    }

    #[test]
    fn test_search_and_category_combine() {
        let items = cursos();

        let filtered = Filter::new("co", "Técnico").apply(&items);

        let ids: Vec<i64> = filtered.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_empty_store_yields_empty_result() {
        let items: Vec<Curso> = Vec::new();
        assert!(Filter::new("algo", "todos").apply(&items).is_empty());
        assert!(Filter::new("", "todos").apply(&items).is_empty());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(CategoryFilter::parse(""), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("todos"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("Técnico"),
            CategoryFilter::Exact("Técnico".to_string())
        );
        assert_eq!(CategoryFilter::All.as_str(), "todos");
    }
}
