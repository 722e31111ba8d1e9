//! Conversion of raw MANGA Plus JSON into the typed records in [`crate::types`].
//!
//! Every record has a `from_api` constructor. Required keys are read with
//! [`required`], optional ones with [`optional`]; a JSON `null` counts as
//! absent for optional keys. Any failure aborts the whole record.

use serde_json::{Map, Value};

use crate::error::{MappingError, PayloadKind};
use crate::types::{Chapter, ChapterListEntry, ChapterPage, Manga, Title};

pub type Object = Map<String, Value>;

/// Marker key of page entries that carry an actual image.
const MANGA_PAGE: &str = "mangaPage";

/// A JSON value that can be read out of an object field.
pub trait FieldValue: Sized {
    const EXPECTED: &'static str;
    fn from_value(value: &Value) -> Option<Self>;
}

impl FieldValue for i64 {
    const EXPECTED: &'static str = "an integer";
    fn from_value(value: &Value) -> Option<Self> { value.as_i64() }
}

impl FieldValue for u32 {
    const EXPECTED: &'static str = "an unsigned 32-bit integer";
    fn from_value(value: &Value) -> Option<Self> { value.as_u64().and_then(|n| u32::try_from(n).ok()) }
}

impl FieldValue for bool {
    const EXPECTED: &'static str = "a boolean";
    fn from_value(value: &Value) -> Option<Self> { value.as_bool() }
}

impl FieldValue for String {
    const EXPECTED: &'static str = "a string";
    fn from_value(value: &Value) -> Option<Self> { value.as_str().map(str::to_string) }
}

impl FieldValue for Vec<Value> {
    const EXPECTED: &'static str = "an array";
    fn from_value(value: &Value) -> Option<Self> { value.as_array().cloned() }
}

pub fn required<T: FieldValue>(obj: &Object, key: &str) -> Result<T, MappingError> {
    let value = obj.get(key).ok_or_else(|| MappingError::MissingField(key.to_string()))?;
    T::from_value(value).ok_or_else(|| MappingError::InvalidType { field: key.to_string(), expected: T::EXPECTED })
}

pub fn optional<T: FieldValue>(obj: &Object, key: &str) -> Result<Option<T>, MappingError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::from_value(value)
            .map(Some)
            .ok_or_else(|| MappingError::InvalidType { field: key.to_string(), expected: T::EXPECTED }),
    }
}

fn required_object<'a>(obj: &'a Object, key: &str) -> Result<&'a Object, MappingError> {
    obj.get(key)
        .ok_or_else(|| MappingError::MissingField(key.to_string()))?
        .as_object()
        .ok_or_else(|| MappingError::InvalidType { field: key.to_string(), expected: "an object" })
}

fn as_object<'a>(value: &'a Value, field: &str) -> Result<&'a Object, MappingError> {
    value
        .as_object()
        .ok_or_else(|| MappingError::InvalidType { field: field.to_string(), expected: "an object" })
}

/// Unwrap `{"success": {<key>: {...}}}`. Both levels must be non-empty objects.
pub fn envelope<'a>(response: &'a Value, key: &'static str, kind: PayloadKind) -> Result<&'a Object, MappingError> {
    let truthy = |v: Option<&'a Value>| v.and_then(Value::as_object).filter(|o| !o.is_empty());
    let success = truthy(response.get("success")).ok_or(MappingError::InvalidPayload { kind, key: "success" })?;
    truthy(success.get(key)).ok_or(MappingError::InvalidPayload { kind, key })
}

fn chapter_list(view: &Object, key: &str) -> Result<Vec<ChapterListEntry>, MappingError> {
    let items: Vec<Value> = required(view, key)?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("{key}[{i}]");
            let obj = as_object(item, &path)?;
            ChapterListEntry::from_api(obj).map_err(|e| e.within(&path))
        })
        .collect()
}

impl Title {
    pub fn from_api(obj: &Object) -> Result<Self, MappingError> {
        Ok(Self {
            title_id: required(obj, "titleId")?,
            name: required(obj, "name")?,
            author: required(obj, "author")?,
            portrait_image_url: optional(obj, "portraitImageUrl")?,
            landscape_image_url: optional(obj, "landscapeImageUrl")?,
            view_count: optional(obj, "viewCount")?,
        })
    }
}

impl ChapterListEntry {
    pub fn from_api(obj: &Object) -> Result<Self, MappingError> {
        Ok(Self {
            title_id: required(obj, "titleId")?,
            chapter_id: required(obj, "chapterId")?,
            name: required(obj, "name")?,
            start_time_stamp: required(obj, "startTimeStamp")?,
            sub_title: optional(obj, "subTitle")?,
            thumbnail_url: optional(obj, "thumbnailUrl")?,
            end_time_stamp: optional(obj, "endTimeStamp")?,
            already_viewed: optional(obj, "alreadyViewed")?.unwrap_or(false),
        })
    }
}

impl Manga {
    /// Map a full `title_detail` response.
    pub fn from_api(response: &Value) -> Result<Self, MappingError> {
        let view = envelope(response, "titleDetailView", PayloadKind::Manga)?;
        let title = Title::from_api(required_object(view, "title")?).map_err(|e| e.within("title"))?;
        let last_chapter_list = match view.get("lastChapterList") {
            None | Some(Value::Null) => Vec::new(),
            Some(_) => chapter_list(view, "lastChapterList")?,
        };
        Ok(Self {
            title,
            title_image_url: required(view, "titleImageUrl")?,
            overview: required(view, "overview")?,
            background_image_url: required(view, "backgroundImageUrl")?,
            first_chapter_list: chapter_list(view, "firstChapterList")?,
            last_chapter_list,
            next_time_stamp: optional(view, "nextTimeStamp")?,
            viewing_period_description: optional(view, "viewingPeriodDescription")?,
        })
    }
}

impl ChapterPage {
    /// Map one page entry, unwrapping the `mangaPage` variant tag when present.
    pub fn from_api(obj: &Object) -> Result<Self, MappingError> {
        match obj.get(MANGA_PAGE) {
            Some(inner) => Self::from_page(as_object(inner, MANGA_PAGE)?).map_err(|e| e.within(MANGA_PAGE)),
            None => Self::from_page(obj),
        }
    }

    fn from_page(obj: &Object) -> Result<Self, MappingError> {
        let width: u32 = required(obj, "width")?;
        let height: u32 = required(obj, "height")?;
        for (field, value) in [("width", width), ("height", height)] {
            if value == 0 {
                return Err(MappingError::InvalidValue { field: field.to_string(), reason: "must be positive".to_string() });
            }
        }
        let encryption_key: String = required(obj, "encryptionKey")?;
        if !encryption_key.is_empty() {
            hex::decode(&encryption_key).map_err(|e| MappingError::InvalidValue {
                field: "encryptionKey".to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(Self { image_url: required(obj, "imageUrl")?, width, height, encryption_key })
    }
}

impl Chapter {
    /// Map a full `manga_viewer` response. Page entries without a `mangaPage` are dropped.
    pub fn from_api(response: &Value) -> Result<Self, MappingError> {
        let viewer = envelope(response, "mangaViewer", PayloadKind::Chapter)?;
        let raw_pages: Vec<Value> = required(viewer, "pages")?;
        let pages = raw_pages
            .iter()
            .enumerate()
            .filter_map(|(i, page)| page.as_object().filter(|o| o.contains_key(MANGA_PAGE)).map(|o| (i, o)))
            .map(|(i, obj)| ChapterPage::from_api(obj).map_err(|e| e.within(&format!("pages[{i}]"))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            chapter_id: required(viewer, "chapterId")?,
            title_id: required(viewer, "titleId")?,
            chapters: required(viewer, "chapters")?,
            title_name: required(viewer, "titleName")?,
            chapter_name: required(viewer, "chapterName")?,
            pages,
            number_of_comments: optional(viewer, "numberOfComments")?.unwrap_or(0),
            region_code: optional(viewer, "regionCode")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Object {
        v.as_object().cloned().unwrap()
    }

    fn title_json() -> Value {
        json!({
            "titleId": 100020,
            "name": "One Piece",
            "author": "Eiichiro Oda",
            "portraitImageUrl": "https://cdn.example.com/portrait.jpg",
            "landscapeImageUrl": "https://cdn.example.com/landscape.jpg",
            "viewCount": 123456
        })
    }

    fn entry_json(chapter_id: i64) -> Value {
        json!({
            "titleId": 100020,
            "chapterId": chapter_id,
            "name": format!("#{chapter_id}"),
            "subTitle": "Romance Dawn",
            "thumbnailUrl": "https://cdn.example.com/thumb.jpg",
            "startTimeStamp": 1500000000,
            "endTimeStamp": 1900000000,
            "alreadyViewed": true
        })
    }

    fn page_json(n: u32) -> Value {
        json!({
            "mangaPage": {
                "imageUrl": format!("https://cdn.example.com/{n}.jpg"),
                "width": 1126,
                "height": 1600,
                "encryptionKey": "a1b2c3"
            }
        })
    }

    fn manga_json() -> Value {
        json!({
            "success": {
                "titleDetailView": {
                    "title": title_json(),
                    "titleImageUrl": "https://cdn.example.com/title.jpg",
                    "overview": "Pirates.",
                    "backgroundImageUrl": "https://cdn.example.com/bg.jpg",
                    "firstChapterList": [entry_json(1000486), entry_json(1000487)],
                    "lastChapterList": [entry_json(1019000)],
                    "nextTimeStamp": 1700000000,
                    "viewingPeriodDescription": "Latest 3 chapters free"
                }
            }
        })
    }

    fn chapter_json() -> Value {
        json!({
            "success": {
                "mangaViewer": {
                    "chapterId": 1000486,
                    "titleId": 100020,
                    "chapters": [{"chapterId": 1000486, "name": "#001"}],
                    "titleName": "One Piece",
                    "chapterName": "#001",
                    "pages": [page_json(1), {"bannerList": {}}, page_json(2)],
                    "numberOfComments": 42,
                    "regionCode": "US"
                }
            }
        })
    }

    #[test]
    fn title_maps_all_fields() {
        let t = Title::from_api(&obj(title_json())).unwrap();
        assert_eq!(t.title_id, 100020);
        assert_eq!(t.name, "One Piece");
        assert_eq!(t.author, "Eiichiro Oda");
        assert_eq!(t.portrait_image_url.as_deref(), Some("https://cdn.example.com/portrait.jpg"));
        assert_eq!(t.view_count, Some(123456));
    }

    #[test]
    fn title_without_author_fails() {
        let mut raw = obj(title_json());
        raw.remove("author");
        let err = Title::from_api(&raw).unwrap_err();
        assert!(matches!(err, MappingError::MissingField(ref f) if f == "author"));
    }

    #[test]
    fn title_optional_fields_absent() {
        let t = Title::from_api(&obj(json!({"titleId": 1, "name": "n", "author": "a", "viewCount": null}))).unwrap();
        assert_eq!(t.portrait_image_url, None);
        assert_eq!(t.landscape_image_url, None);
        assert_eq!(t.view_count, None);
    }

    #[test]
    fn entry_defaults() {
        let raw = json!({"titleId": 1, "chapterId": 2, "name": "#1", "startTimeStamp": 10});
        let e = ChapterListEntry::from_api(&obj(raw)).unwrap();
        assert!(!e.already_viewed);
        assert_eq!(e.sub_title, None);
        assert_eq!(e.thumbnail_url, None);
        assert_eq!(e.end_time_stamp, None);
    }

    #[test]
    fn entry_wrong_type_is_rejected() {
        let raw = json!({"titleId": "1", "chapterId": 2, "name": "#1", "startTimeStamp": 10});
        let err = ChapterListEntry::from_api(&obj(raw)).unwrap_err();
        assert!(matches!(err, MappingError::InvalidType { ref field, .. } if field == "titleId"));
    }

    #[test]
    fn manga_round_trips_every_field() {
        let m = Manga::from_api(&manga_json()).unwrap();
        assert_eq!(m.title, Title::from_api(&obj(title_json())).unwrap());
        assert_eq!(m.title_image_url, "https://cdn.example.com/title.jpg");
        assert_eq!(m.overview, "Pirates.");
        assert_eq!(m.background_image_url, "https://cdn.example.com/bg.jpg");
        assert_eq!(m.first_chapter_list.len(), 2);
        assert_eq!(m.first_chapter_list[1].chapter_id, 1000487);
        assert_eq!(m.first_chapter_list[0].sub_title.as_deref(), Some("Romance Dawn"));
        assert!(m.first_chapter_list[0].already_viewed);
        assert_eq!(m.last_chapter_list.len(), 1);
        assert_eq!(m.next_time_stamp, Some(1700000000));
        assert_eq!(m.viewing_period_description.as_deref(), Some("Latest 3 chapters free"));
    }

    #[test]
    fn manga_empty_view_is_invalid_payload() {
        let err = Manga::from_api(&json!({"success": {}})).unwrap_err();
        assert!(matches!(err, MappingError::InvalidPayload { kind: PayloadKind::Manga, key: "success" }));

        let err = Manga::from_api(&json!({"success": {"titleDetailView": {}}})).unwrap_err();
        assert!(matches!(err, MappingError::InvalidPayload { kind: PayloadKind::Manga, key: "titleDetailView" }));
        assert_eq!(err.to_string(), "invalid manga json: missing or empty `titleDetailView`");

        let err = Manga::from_api(&json!({"error": {"popup": {}}})).unwrap_err();
        assert!(matches!(err, MappingError::InvalidPayload { .. }));
    }

    #[test]
    fn manga_last_chapters_default_empty() {
        let mut raw = manga_json();
        raw["success"]["titleDetailView"].as_object_mut().unwrap().remove("lastChapterList");
        let m = Manga::from_api(&raw).unwrap();
        assert!(m.last_chapter_list.is_empty());
    }

    #[test]
    fn manga_null_last_chapters_is_empty() {
        let mut raw = manga_json();
        raw["success"]["titleDetailView"]["lastChapterList"] = Value::Null;
        let m = Manga::from_api(&raw).unwrap();
        assert!(m.last_chapter_list.is_empty());
    }

    #[test]
    fn manga_bad_chapter_entry_fails_whole_mapping() {
        let mut raw = manga_json();
        raw["success"]["titleDetailView"]["firstChapterList"][1]
            .as_object_mut()
            .unwrap()
            .remove("name");
        let err = Manga::from_api(&raw).unwrap_err();
        assert!(matches!(err, MappingError::MissingField(ref f) if f == "firstChapterList[1].name"));
    }

    #[test]
    fn manga_nested_title_error_has_path() {
        let mut raw = manga_json();
        raw["success"]["titleDetailView"]["title"].as_object_mut().unwrap().remove("author");
        let err = Manga::from_api(&raw).unwrap_err();
        assert!(matches!(err, MappingError::MissingField(ref f) if f == "title.author"));
    }

    #[test]
    fn page_unwraps_variant_tag() {
        let wrapped = ChapterPage::from_api(&obj(page_json(7))).unwrap();
        let bare = ChapterPage::from_api(&obj(page_json(7)["mangaPage"].clone())).unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.width, 1126);
        assert_eq!(wrapped.encryption_key, "a1b2c3");
    }

    #[test]
    fn page_rejects_bad_key_and_zero_size() {
        let mut raw = page_json(1);
        raw["mangaPage"]["encryptionKey"] = json!("xyz");
        let err = ChapterPage::from_api(&obj(raw)).unwrap_err();
        assert!(matches!(err, MappingError::InvalidValue { ref field, .. } if field == "encryptionKey"));

        let mut raw = page_json(1);
        raw["mangaPage"]["height"] = json!(0);
        let err = ChapterPage::from_api(&obj(raw)).unwrap_err();
        assert!(matches!(err, MappingError::InvalidValue { ref field, .. } if field == "height"));

        let mut raw = page_json(1);
        raw["mangaPage"]["encryptionKey"] = json!("");
        assert!(ChapterPage::from_api(&obj(raw)).is_ok());
    }

    #[test]
    fn chapter_keeps_only_image_pages() {
        let c = Chapter::from_api(&chapter_json()).unwrap();
        assert_eq!(c.pages.len(), 2);
        assert_eq!(c.pages[0].image_url, "https://cdn.example.com/1.jpg");
        assert_eq!(c.pages[1].image_url, "https://cdn.example.com/2.jpg");
        assert_eq!(c.chapters, vec![json!({"chapterId": 1000486, "name": "#001"})]);
        assert_eq!(c.number_of_comments, 42);
        assert_eq!(c.region_code.as_deref(), Some("US"));
    }

    #[test]
    fn chapter_defaults() {
        let mut raw = chapter_json();
        let viewer = raw["success"]["mangaViewer"].as_object_mut().unwrap();
        viewer.remove("numberOfComments");
        viewer.remove("regionCode");
        let c = Chapter::from_api(&raw).unwrap();
        assert_eq!(c.number_of_comments, 0);
        assert_eq!(c.region_code, None);
    }

    #[test]
    fn chapter_envelope_errors_name_context() {
        let err = Chapter::from_api(&json!({"success": {"titleDetailView": {"x": 1}}})).unwrap_err();
        assert!(matches!(err, MappingError::InvalidPayload { kind: PayloadKind::Chapter, key: "mangaViewer" }));
        assert_eq!(err.to_string(), "invalid chapter json: missing or empty `mangaViewer`");
    }

    #[test]
    fn chapter_page_tag_not_an_object() {
        let mut raw = chapter_json();
        raw["success"]["mangaViewer"]["pages"][0]["mangaPage"] = json!("oops");
        let err = Chapter::from_api(&raw).unwrap_err();
        assert!(matches!(err, MappingError::InvalidType { ref field, .. } if field == "pages[0].mangaPage"));
    }

    #[test]
    fn chapter_bad_page_has_path() {
        let mut raw = chapter_json();
        raw["success"]["mangaViewer"]["pages"][2]["mangaPage"]
            .as_object_mut()
            .unwrap()
            .remove("imageUrl");
        let err = Chapter::from_api(&raw).unwrap_err();
        assert!(matches!(err, MappingError::MissingField(ref f) if f == "pages[2].mangaPage.imageUrl"));
    }
}
