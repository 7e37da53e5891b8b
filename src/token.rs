//! Token model shared by every grammar and renderer
//!
//! A grammar turns text into a sequence of [`Token`]s. Each token borrows its
//! lexeme from the input and carries a [`Category`], which is all a style
//! needs to decide how to paint it.

/// Semantic class of a lexeme
///
/// Categories form a shallow tree (see [`Category::parent`]). Styles only
/// need to define the categories they care about; everything else inherits
/// from its parent, and the root categories fall back to "no attribute".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Text,
    Whitespace,
    Error,
    Punctuation,
    Operator,
    Keyword,
    KeywordConstant,
    Name,
    NameTag,
    NameAttribute,
    NameEntity,
    NameNamespace,
    String,
    Number,
    Comment,
    CommentPreproc,
}

impl Category {
    /// The more general category this one refines, if any
    pub fn parent(self) -> Option<Category> {
        match self {
            Category::Whitespace => Some(Category::Text),
            Category::KeywordConstant => Some(Category::Keyword),
            Category::NameTag
            | Category::NameAttribute
            | Category::NameEntity
            | Category::NameNamespace => Some(Category::Name),
            Category::CommentPreproc => Some(Category::Comment),
            _ => None,
        }
    }

    /// Iterate over this category followed by each of its ancestors
    pub fn lineage(self) -> impl Iterator<Item = Category> {
        std::iter::successors(Some(self), |c| c.parent())
    }
}

/// A categorized slice of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub lexeme: &'a str,
    pub category: Category,
}

impl<'a> Token<'a> {
    pub fn new(lexeme: &'a str, category: Category) -> Self {
        Self { lexeme, category }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_categories_have_no_parent() {
        assert_eq!(Category::Text.parent(), None);
        assert_eq!(Category::Name.parent(), None);
        assert_eq!(Category::String.parent(), None);
    }

    #[test]
    fn test_lineage_walks_to_root() {
        let lineage: Vec<_> = Category::NameTag.lineage().collect();
        assert_eq!(lineage, vec![Category::NameTag, Category::Name]);

        let lineage: Vec<_> = Category::KeywordConstant.lineage().collect();
        assert_eq!(lineage, vec![Category::KeywordConstant, Category::Keyword]);
    }
}
