//! # Idea Selection
//!
//! Turns an [`IdeaQuery`] into a store-agnostic plan: which columns to
//! project, which predicates to AND together, how to order and paginate.
//! Adapters render the plan with bound parameters; caller values never
//! become part of query text.

use crate::error::DomainError;
use crate::models::Idea;
use crate::requests::IdeaQuery;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Columns every listing returns.
pub const BASE_COLUMNS: &[&str] = &[
    "id",
    "author_email",
    "tags",
    "bad_flag",
    "enabled",
    "issues",
    "votes",
    "created_at",
    "updated_at",
];

/// Optional column groups on top of [`BASE_COLUMNS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Projection {
    pub summary: bool,
    pub content: bool,
    pub media: bool,
    /// `issues_ips` and `voters_ids`; only the top-popular listing returns them.
    pub audit: bool,
}

impl Projection {
    pub const FULL: Projection = Projection {
        summary: true,
        content: true,
        media: true,
        audit: true,
    };

    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = BASE_COLUMNS.to_vec();
        if self.summary {
            columns.push("summary");
        }
        if self.content {
            columns.push("content");
        }
        if self.media {
            columns.extend(["media", "media_types"]);
        }
        if self.audit {
            columns.extend(["issues_ips", "voters_ids"]);
        }
        columns
    }

    /// Blanks the fields this projection leaves out.
    pub fn apply(&self, mut idea: Idea) -> Idea {
        if !self.summary {
            idea.summary.clear();
        }
        if !self.content {
            idea.content.clear();
        }
        if !self.media {
            idea.media.clear();
            idea.media_types.clear();
        }
        if !self.audit {
            idea.issues_ips.clear();
            idea.voters_ids.clear();
        }
        idea
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdeaPredicate {
    IdEquals(String),
    HasMediaType(String),
    MinVotes(i64),
    MaxVotes(i64),
}

impl IdeaPredicate {
    pub fn matches(&self, idea: &Idea) -> bool {
        match self {
            IdeaPredicate::IdEquals(id) => &idea.id == id,
            IdeaPredicate::HasMediaType(kind) => idea.media_types.iter().any(|t| t == kind),
            IdeaPredicate::MinVotes(min) => idea.votes >= *min,
            IdeaPredicate::MaxVotes(max) => idea.votes <= *max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdeaOrder {
    /// Creation order, oldest first.
    Insertion,
    VotesDesc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaSelection {
    pub projection: Projection,
    pub predicates: Vec<IdeaPredicate>,
    pub order: IdeaOrder,
    pub limit: i64,
    pub offset: i64,
}

impl IdeaSelection {
    /// Builds the plan for `query`.
    ///
    /// A non-zero `top_popular_number` switches to the popularity listing and
    /// every other field is ignored.
    pub fn plan(query: &IdeaQuery) -> Result<Self, DomainError> {
        if query.top_popular_number < 0 {
            return Err(DomainError::BadRequest(
                "top_popular_number must not be negative".into(),
            ));
        }
        if query.top_popular_number != 0 {
            return Ok(Self {
                projection: Projection::FULL,
                predicates: Vec::new(),
                order: IdeaOrder::VotesDesc,
                limit: query.top_popular_number,
                offset: 0,
            });
        }

        if query.page_size < 0 || query.page_number < 0 {
            return Err(DomainError::BadRequest(
                "page_size and page_number must not be negative".into(),
            ));
        }
        if query.page_size > MAX_PAGE_SIZE {
            return Err(DomainError::BadRequest(format!(
                "page_size must not exceed {MAX_PAGE_SIZE}"
            )));
        }
        let limit = if query.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            query.page_size
        };
        let offset = query.page_number.checked_mul(limit).ok_or_else(|| {
            DomainError::BadRequest("page_number is out of range".into())
        })?;

        let mut predicates = Vec::new();
        if !query.idea_id.is_empty() {
            predicates.push(IdeaPredicate::IdEquals(query.idea_id.clone()));
        }
        if !query.media_type.is_empty() {
            predicates.push(IdeaPredicate::HasMediaType(query.media_type.clone()));
        }
        if query.min_popularity != 0 {
            predicates.push(IdeaPredicate::MinVotes(query.min_popularity));
        }
        if query.max_popularity != 0 {
            predicates.push(IdeaPredicate::MaxVotes(query.max_popularity));
        }

        Ok(Self {
            projection: Projection {
                summary: query.include_summary,
                content: query.include_content,
                media: query.include_media,
                audit: false,
            },
            predicates,
            order: IdeaOrder::Insertion,
            limit,
            offset,
        })
    }

    pub fn matches(&self, idea: &Idea) -> bool {
        self.predicates.iter().all(|p| p.matches(idea))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let plan = IdeaSelection::plan(&IdeaQuery::default()).unwrap();
        assert_eq!(plan.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(plan.offset, 0);
        assert!(plan.predicates.is_empty());
        assert_eq!(plan.order, IdeaOrder::Insertion);
        assert_eq!(plan.projection, Projection::default());
    }

    #[test]
    fn offset_is_page_number_times_size() {
        let query = IdeaQuery {
            page_size: 5,
            page_number: 2,
            ..IdeaQuery::default()
        };
        let plan = IdeaSelection::plan(&query).unwrap();
        assert_eq!((plan.limit, plan.offset), (5, 10));
    }

    #[test]
    fn predicates_keep_fixed_order() {
        let query = IdeaQuery {
            max_popularity: 9,
            min_popularity: 2,
            media_type: "image/png".into(),
            idea_id: "abc".into(),
            ..IdeaQuery::default()
        };
        let plan = IdeaSelection::plan(&query).unwrap();
        assert_eq!(
            plan.predicates,
            vec![
                IdeaPredicate::IdEquals("abc".into()),
                IdeaPredicate::HasMediaType("image/png".into()),
                IdeaPredicate::MinVotes(2),
                IdeaPredicate::MaxVotes(9),
            ]
        );
    }

    #[test]
    fn top_popular_ignores_everything_else() {
        let query = IdeaQuery {
            top_popular_number: 3,
            idea_id: "abc".into(),
            page_size: 50,
            page_number: 4,
            include_summary: false,
            ..IdeaQuery::default()
        };
        let plan = IdeaSelection::plan(&query).unwrap();
        assert_eq!(plan.order, IdeaOrder::VotesDesc);
        assert_eq!((plan.limit, plan.offset), (3, 0));
        assert!(plan.predicates.is_empty());
        assert_eq!(plan.projection, Projection::FULL);
    }

    #[test]
    fn rejects_bad_pagination() {
        for query in [
            IdeaQuery { page_size: -1, ..IdeaQuery::default() },
            IdeaQuery { page_number: -1, ..IdeaQuery::default() },
            IdeaQuery { page_size: MAX_PAGE_SIZE + 1, ..IdeaQuery::default() },
            IdeaQuery { top_popular_number: -2, ..IdeaQuery::default() },
        ] {
            assert!(matches!(
                IdeaSelection::plan(&query),
                Err(DomainError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn projection_columns() {
        let projection = Projection {
            summary: true,
            media: true,
            ..Projection::default()
        };
        let columns = projection.columns();
        assert_eq!(&columns[..BASE_COLUMNS.len()], BASE_COLUMNS);
        assert_eq!(&columns[BASE_COLUMNS.len()..], ["summary", "media", "media_types"]);
        assert_eq!(Projection::FULL.columns().len(), BASE_COLUMNS.len() + 6);
    }
}
