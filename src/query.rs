use sqlx::{Postgres, postgres::PgArguments, query::QueryAs};

use crate::{
    models::{StoreListParams, UserListParams},
    validation::ValidationError,
};

/// Sortable columns of `GET /users`.
pub const USER_SORT_COLUMNS: &[&str] = &["id", "name", "email", "address", "user_role", "created_at"];
/// Sortable columns of `GET /stores`.
pub const STORE_SORT_COLUMNS: &[&str] = &["id", "name", "address", "owner_id", "created_at"];

const DEFAULT_SORT_COLUMN: &str = "id";

/// A positional query parameter. Values only ever reach the database through
/// these bindings, never through the SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Int(i32),
}

/// SqlQuery
///
/// A fully parameterized statement: `$1..$n` placeholders in `sql`, matched
/// in order by `params`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl SqlQuery {
    /// Attach the bound parameters to a typed sqlx query over `self.sql`.
    pub fn bind_all<'q, O>(
        &'q self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for param in &self.params {
            query = match param {
                SqlParam::Text(value) => query.bind(value.as_str()),
                SqlParam::Int(value) => query.bind(*value),
            };
        }
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive "desc" is descending; anything else, including absence, ascending.
    pub fn parse(order: Option<&str>) -> Self {
        match order {
            Some(o) if o.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// SortSpec
///
/// A sort column taken from an allow-list, so it is safe to splice into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Resolve a requested sort against `allowed`. An unknown or missing
    /// column silently becomes `id`.
    // Do not turn the fallback into an error without product sign-off.
    pub fn resolve(allowed: &[&'static str], sort_by: Option<&str>, order: Option<&str>) -> Self {
        let field = sort_by
            .and_then(|requested| allowed.iter().copied().find(|c| *c == requested))
            .unwrap_or(DEFAULT_SORT_COLUMN);

        SortSpec {
            field,
            direction: SortDirection::parse(order),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Case-insensitive substring (`ILIKE '%v%'`).
    Contains,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub kind: MatchKind,
    pub value: SqlParam,
}

/// FilterSet
///
/// Predicates built from the request, in request-field order. Absent and
/// empty fields are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.filters.push(Filter {
                column,
                kind: MatchKind::Contains,
                value: SqlParam::Text(format!("%{}%", v)),
            });
        }
        self
    }

    pub fn equals_text(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.filters.push(Filter {
                column,
                kind: MatchKind::Exact,
                value: SqlParam::Text(v.to_string()),
            });
        }
        self
    }

    pub fn equals_int(mut self, column: &'static str, value: Option<i32>) -> Self {
        if let Some(v) = value {
            self.filters.push(Filter {
                column,
                kind: MatchKind::Exact,
                value: SqlParam::Int(v),
            });
        }
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Resource
///
/// A listable table. Each variant owns its base select, sortable columns and
/// any parameters that precede the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    /// Stores as seen by `viewer_id`, whose own rating is joined in.
    Stores { viewer_id: i32 },
}

impl Resource {
    pub fn sort_columns(&self) -> &'static [&'static str] {
        match self {
            Resource::Users => USER_SORT_COLUMNS,
            Resource::Stores { .. } => STORE_SORT_COLUMNS,
        }
    }

    fn base_select(&self) -> &'static str {
        match self {
            Resource::Users => "SELECT id, name, email, address, user_role AS role FROM users WHERE 1=1",
            Resource::Stores { .. } => {
                "SELECT s.id, s.name, s.email, s.address, s.owner_id, \
                 ROUND(COALESCE(AVG(r.rating), 0)::numeric, 2)::float8 AS avg_rating, \
                 ur.rating AS user_rating \
                 FROM stores s \
                 LEFT JOIN ratings r ON s.id = r.store_id \
                 LEFT JOIN ratings ur ON s.id = ur.store_id AND ur.user_id = $1 \
                 WHERE 1=1"
            }
        }
    }

    fn column_prefix(&self) -> &'static str {
        match self {
            Resource::Users => "",
            Resource::Stores { .. } => "s.",
        }
    }

    fn group_by(&self) -> Option<&'static str> {
        match self {
            Resource::Users => None,
            Resource::Stores { .. } => Some("s.id, ur.rating"),
        }
    }

    fn leading_params(&self) -> Vec<SqlParam> {
        match self {
            Resource::Users => vec![],
            Resource::Stores { viewer_id } => vec![SqlParam::Int(*viewer_id)],
        }
    }
}

/// build
///
/// Assemble the listing query for `resource`. Filter values are bound as
/// positional parameters numbered after the resource's own leading
/// parameters; the only identifiers spliced into the text are allow-listed
/// column names.
pub fn build(
    resource: &Resource,
    filters: &FilterSet,
    sort_by: Option<&str>,
    order: Option<&str>,
) -> SqlQuery {
    let sort = SortSpec::resolve(resource.sort_columns(), sort_by, order);
    let prefix = resource.column_prefix();

    let mut sql = String::from(resource.base_select());
    let mut params = resource.leading_params();

    for filter in filters.filters() {
        params.push(filter.value.clone());
        let placeholder = params.len();
        match filter.kind {
            MatchKind::Contains => {
                sql.push_str(&format!(" AND {}{} ILIKE ${}", prefix, filter.column, placeholder))
            }
            MatchKind::Exact => {
                sql.push_str(&format!(" AND {}{} = ${}", prefix, filter.column, placeholder))
            }
        }
    }

    if let Some(group_by) = resource.group_by() {
        sql.push_str(&format!(" GROUP BY {}", group_by));
    }

    sql.push_str(&format!(
        " ORDER BY {}{} {}",
        prefix,
        sort.field,
        sort.direction.as_sql()
    ));

    SqlQuery { sql, params }
}

impl UserListParams {
    pub fn filter_set(&self) -> FilterSet {
        FilterSet::new()
            .contains("name", self.name.as_deref())
            .contains("email", self.email.as_deref())
            .contains("address", self.address.as_deref())
            .equals_text("user_role", self.role.as_deref())
    }

    pub fn to_query(&self) -> SqlQuery {
        build(
            &Resource::Users,
            &self.filter_set(),
            self.sort_by.as_deref(),
            self.order.as_deref(),
        )
    }
}

impl StoreListParams {
    /// Fails only when `owner_id` is present but not an integer.
    pub fn filter_set(&self) -> Result<FilterSet, ValidationError> {
        let owner_id = self
            .owner_id
            .as_deref()
            .map(|raw| raw.trim().parse::<i32>())
            .transpose()
            .map_err(|_| ValidationError::InvalidOwnerId)?;

        Ok(FilterSet::new()
            .contains("name", self.name.as_deref())
            .contains("address", self.address.as_deref())
            .equals_int("owner_id", owner_id))
    }

    pub fn to_query(&self, viewer_id: i32) -> Result<SqlQuery, ValidationError> {
        Ok(build(
            &Resource::Stores { viewer_id },
            &self.filter_set()?,
            self.sort_by.as_deref(),
            self.order.as_deref(),
        ))
    }
}
