use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, Selectable};
use std::fmt;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbBookmark {
    pub id: i32,
    #[diesel(column_name = "URL")]
    pub url: String,
    pub metadata: String,
    pub tags: String,
    pub desc: String,
    pub flags: i32,
    pub last_update_ts: NaiveDateTime,
    pub created_ts: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
pub struct NewBookmark {
    #[diesel(column_name = "URL")]
    pub url: String,
    pub metadata: String,
    pub tags: String,
    pub desc: String,
    pub flags: i32,
    pub created_ts: Option<NaiveDateTime>,
}

impl fmt::Display for NewBookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "URL: {}, metadata: {}, tags: {}, desc: {}, created_ts: {}",
            self.url,
            self.metadata,
            self.tags,
            self.desc,
            self.created_ts
                .map_or("None".to_string(), |ts| ts.to_string())
        )
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::tag_catalogue)]
pub struct NewCatalogueTag<'a> {
    pub name: &'a str,
}
