//! SVG test fixtures

use crate::render::FieldItem;
use crate::storage::{FileItem, MemoryFileStorage};

/// Script, event handler and XML declaration around one `<rect/>`
pub const HOSTILE_SVG: &str =
    r#"<?xml version="1.0"?><svg onload="alert(0)"><script>alert(1)</script><rect/></svg>"#;

/// External entity declaration (XXE)
pub const XXE_SVG: &str = r#"<?xml version="1.0"?>
<!DOCTYPE svg [ <!ENTITY xxe SYSTEM "file:///etc/passwd"> ]>
<svg xmlns="http://www.w3.org/2000/svg"><text>&xxe;</text></svg>"#;

/// Exponential entity expansion ("billion laughs")
pub const ENTITY_BOMB_SVG: &str = r#"<!DOCTYPE svg [
  <!ENTITY a "lol">
  <!ENTITY b "&a;&a;&a;&a;&a;&a;&a;&a;&a;&a;">
  <!ENTITY c "&b;&b;&b;&b;&b;&b;&b;&b;&b;&b;">
]>
<svg><text>&c;</text></svg>"#;

/// HTML smuggled through `foreignObject`
pub const FOREIGN_OBJECT_SVG: &str = r#"<svg><foreignObject width="10" height="10"><body xmlns="http://www.w3.org/1999/xhtml"><img src="x" onerror="alert(1)"/></body></foreignObject><circle r="2"/></svg>"#;

/// PNG signature and IHDR length
pub const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];

/// Storage holding `public://{name}` for each fixture
pub fn fixture_storage(files: &[(&str, &str, &[u8])]) -> MemoryFileStorage {
    let storage = MemoryFileStorage::new();
    for (name, content_type, data) in files {
        storage.insert(format!("public://{name}"), *content_type, data.to_vec());
    }
    storage
}

/// Field item for `public://{name}`
pub fn field_item(delta: usize, id: &str, name: &str, content_type: &str) -> FieldItem {
    FieldItem::new(
        delta,
        FileItem::new(id, format!("public://{name}"), name, content_type),
    )
}
