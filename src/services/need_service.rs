use serde_json::{Map, Value};
use std::sync::Arc;

use super::{insert_list, insert_number, insert_text};
use crate::database::models::{fields, Need, NeedContent, NeedStatus};
use crate::database::{DatabaseError, DocumentStore, Repository};
use crate::filter::Pagination;

/// List filters; each present, non-empty value adds one clause
#[derive(Debug, Clone, Default)]
pub struct NeedFilter {
    pub author: Option<String>,
    pub title: Option<String>,
    pub status: Option<NeedStatus>,
    pub customer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewNeed {
    pub author: String,
    pub title: String,
    pub created_at: String,
    pub start_at_latest: Option<String>,
    pub customer: String,
    pub contact: String,
    pub description: Option<String>,
    pub success_keys: Vec<String>,
    pub month_duration: Option<f64>,
    pub week_frequency: Option<f64>,
    pub rate: Option<f64>,
    pub consultants: Vec<String>,
    pub status: NeedStatus,
}

impl NewNeed {
    /// Absent optionals are left out of the document entirely
    pub fn to_document(&self) -> Map<String, Value> {
        let mut document = Map::new();
        insert_text(&mut document, fields::AUTHOR, Some(&self.author));
        insert_text(&mut document, fields::TITLE, Some(&self.title));
        insert_text(&mut document, fields::CREATED_AT, Some(&self.created_at));
        insert_text(&mut document, fields::START_AT_LATEST, self.start_at_latest.as_deref());
        insert_text(&mut document, fields::CUSTOMER, Some(&self.customer));
        insert_text(&mut document, fields::CONTACT, Some(&self.contact));
        insert_text(&mut document, fields::DESCRIPTION, self.description.as_deref());
        insert_list(&mut document, fields::SUCCESS_KEYS, "key", &self.success_keys);
        insert_number(&mut document, fields::MONTH_DURATION, self.month_duration);
        insert_number(&mut document, fields::WEEK_FREQUENCY, self.week_frequency);
        insert_number(&mut document, fields::RATE, self.rate);
        insert_list(&mut document, fields::CONSULTANTS, "id", &self.consultants);
        document.insert(fields::STATUS.to_string(), Value::String(self.status.as_str().to_string()));
        document
    }
}

/// Partial update. `author`, `customer`, `contact` and `created_at` are
/// fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct NeedPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub success_keys: Option<Vec<String>>,
    pub start_at_latest: Option<String>,
    pub month_duration: Option<f64>,
    pub week_frequency: Option<f64>,
    pub rate: Option<f64>,
    pub consultants: Option<Vec<String>>,
    pub status: Option<NeedStatus>,
}

impl NeedPatch {
    pub fn to_document(&self) -> Map<String, Value> {
        let mut document = Map::new();
        insert_text(&mut document, fields::TITLE, self.title.as_deref());
        insert_text(&mut document, fields::DESCRIPTION, self.description.as_deref());
        if let Some(keys) = &self.success_keys {
            insert_list(&mut document, fields::SUCCESS_KEYS, "key", keys);
        }
        insert_text(&mut document, fields::START_AT_LATEST, self.start_at_latest.as_deref());
        insert_number(&mut document, fields::MONTH_DURATION, self.month_duration);
        insert_number(&mut document, fields::WEEK_FREQUENCY, self.week_frequency);
        insert_number(&mut document, fields::RATE, self.rate);
        if let Some(consultants) = &self.consultants {
            insert_list(&mut document, fields::CONSULTANTS, "id", consultants);
        }
        if let Some(status) = self.status {
            document.insert(fields::STATUS.to_string(), Value::String(status.as_str().to_string()));
        }
        document
    }
}

/// Needs and their attachment records, which share the needs index
#[derive(Clone)]
pub struct NeedService {
    store: Arc<dyn DocumentStore>,
    needs: Repository<Need>,
    contents: Repository<NeedContent>,
}

impl NeedService {
    pub fn new(store: Arc<dyn DocumentStore>, index: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            needs: Repository::new(index.clone(), store.clone()),
            contents: Repository::new(index, store.clone()),
            store,
        }
    }

    pub fn with_index(&self, index: impl Into<String>) -> Self {
        Self::new(self.store.clone(), index)
    }

    pub fn index(&self) -> &str {
        self.needs.index()
    }

    pub async fn get_need_by_id(&self, id: &str) -> Result<Option<Need>, DatabaseError> {
        self.needs.select_id(id).await
    }

    pub async fn get_needs(&self, filter: &NeedFilter, pagination: Pagination) -> Result<Vec<Need>, DatabaseError> {
        let query = self
            .needs
            .query()?
            .term_opt(fields::AUTHOR, filter.author.as_deref())?
            .matches_opt(fields::TITLE, filter.title.as_deref())?
            .term_opt(fields::STATUS, filter.status.map(|s| s.as_str()))?
            .term_opt(fields::CUSTOMER, filter.customer.as_deref())?
            .paginate(pagination);
        self.needs.select_any(query).await
    }

    pub async fn create_need(&self, need: &NewNeed) -> Result<Option<Need>, DatabaseError> {
        self.needs.create(need.to_document()).await
    }

    pub async fn update_need(&self, id: &str, patch: &NeedPatch) -> Result<bool, DatabaseError> {
        self.needs.update(id, patch.to_document()).await
    }

    pub async fn delete_need(&self, id: &str) -> Result<bool, DatabaseError> {
        self.needs.delete_id(id).await
    }

    pub async fn get_need_content_by_id(&self, id: &str) -> Result<Option<NeedContent>, DatabaseError> {
        self.contents.select_id(id).await
    }

    pub async fn create_need_content(&self, need_id: &str, filename: &str) -> Result<Option<NeedContent>, DatabaseError> {
        let mut document = Map::new();
        document.insert(fields::NEED.to_string(), Value::String(need_id.to_string()));
        document.insert(fields::FILENAME.to_string(), Value::String(filename.to_string()));
        self.contents.create(document).await
    }

    pub async fn delete_need_content(&self, id: &str) -> Result<bool, DatabaseError> {
        self.contents.delete_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::MISSING_NUMBER;
    use crate::testing::TestContext;
    use serde_json::json;

    #[test]
    fn absent_optionals_are_omitted() {
        let need = NewNeed {
            author: "u1".into(),
            title: "Data lake".into(),
            created_at: "2017-03-01T10:00:00".into(),
            start_at_latest: None,
            customer: "c1".into(),
            contact: "k1".into(),
            description: Some(String::new()),
            success_keys: vec![],
            month_duration: Some(0.0),
            week_frequency: None,
            rate: None,
            consultants: vec!["u2".into()],
            status: NeedStatus::Open,
        };
        assert_eq!(
            Value::Object(need.to_document()),
            json!({
                "Author": "u1",
                "Title": "Data lake",
                "CreatedAt": "2017-03-01T10:00:00",
                "Customer": "c1",
                "Contact": "k1",
                "MonthDuration": 0.0,
                "Consultants": [{ "id": "u2" }],
                "Status": "open"
            })
        );
    }

    #[tokio::test]
    async fn created_need_defaults_optionals() {
        let ctx = TestContext::new();
        let need = ctx.create_need("u1", "Data lake", NeedStatus::Open).await;
        assert_eq!(need.start_at_latest, "");
        assert_eq!(need.description, "");
        assert_eq!(need.rate, MISSING_NUMBER);
        assert_eq!(need.month_duration, MISSING_NUMBER);
        assert!(need.consultants.is_empty());
        assert!(need.success_keys.is_empty());
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let ctx = TestContext::new();
        let need = ctx.create_need("u1", "Data lake", NeedStatus::Open).await;

        let patch = NeedPatch {
            rate: Some(550.0),
            status: Some(NeedStatus::Win),
            ..Default::default()
        };
        assert!(ctx.needs.update_need(&need.id, &patch).await.unwrap());

        let updated = ctx.needs.get_need_by_id(&need.id).await.unwrap().unwrap();
        assert_eq!(updated.rate, 550.0);
        assert_eq!(updated.status, NeedStatus::Win);
        assert_eq!(updated.title, need.title);
        assert_eq!(updated.customer, need.customer);
        assert_eq!(updated.created_at, need.created_at);

        assert!(!ctx.needs.update_need(&need.id, &NeedPatch::default()).await.unwrap());
    }

    #[tokio::test]
    async fn list_filters_by_status_title_and_author() {
        let ctx = TestContext::new();
        ctx.create_need("u1", "Data lake", NeedStatus::Open).await;
        ctx.create_need("u1", "Mobile app", NeedStatus::Lost).await;
        ctx.create_need("u1", "Data warehouse", NeedStatus::Open).await;
        ctx.create_need("u2", "Data mesh", NeedStatus::Open).await;

        let mine = NeedFilter { author: Some("u1".into()), ..Default::default() };
        let all = ctx.needs.get_needs(&mine, Pagination::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let open = NeedFilter { status: Some(NeedStatus::Open), ..mine.clone() };
        let open = ctx.needs.get_needs(&open, Pagination::default()).await.unwrap();
        assert_eq!(open.len(), 2);
        assert!(open.iter().all(|n| n.status == NeedStatus::Open));

        let titled = NeedFilter { title: Some("mobile".into()), ..mine.clone() };
        let titled = ctx.needs.get_needs(&titled, Pagination::default()).await.unwrap();
        assert_eq!(titled.len(), 1);
        assert_eq!(titled[0].title, "Mobile app");
    }

    #[tokio::test]
    async fn pagination_slices_are_stable() {
        let ctx = TestContext::new();
        for n in 0..5 {
            ctx.create_need("u1", &format!("Need {}", n), NeedStatus::Open).await;
        }
        let filter = NeedFilter::default();
        let page = Pagination::new(Some(1), Some(2));

        let first = ctx.needs.get_needs(&filter, page).await.unwrap();
        let second = ctx.needs.get_needs(&filter, page).await.unwrap();
        assert_eq!(first, second);
        let titles: Vec<_> = first.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Need 2", "Need 3"]);
    }

    #[tokio::test]
    async fn delete_missing_need_is_false() {
        let ctx = TestContext::new();
        let need = ctx.create_need("u1", "Data lake", NeedStatus::Open).await;
        assert!(ctx.needs.delete_need(&need.id).await.unwrap());
        assert!(!ctx.needs.delete_need(&need.id).await.unwrap());
        assert!(ctx.needs.get_need_by_id(&need.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn contents_are_separate_from_needs() {
        let ctx = TestContext::new();
        let need = ctx.create_need("u1", "Data lake", NeedStatus::Open).await;
        let content = ctx.needs.create_need_content(&need.id, "scope.png").await.unwrap().unwrap();

        assert_eq!(content.need, need.id);
        assert!(ctx.needs.get_need_by_id(&content.id).await.unwrap().is_none());
        assert_eq!(ctx.needs.get_needs(&NeedFilter::default(), Pagination::default()).await.unwrap().len(), 1);

        assert!(ctx.needs.delete_need_content(&content.id).await.unwrap());
        assert!(ctx.needs.get_need_content_by_id(&content.id).await.unwrap().is_none());
    }
}
