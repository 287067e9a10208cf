use crate::types::BlockId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// The block type string Notion uses for synced blocks.
pub const SYNCED_BLOCK_TYPE: &str = "synced_block";

/// A content block as returned by the block endpoints.
///
/// The type-keyed payload (`block["paragraph"]`, `block["synced_block"]`, ...)
/// is kept as opaque JSON; only the few fields the relay inspects are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: BlockId,
    pub block_type: String,
    /// `None` when the object carries no field named after its type.
    pub payload: Option<Value>,
    pub has_children: bool,
}

#[derive(Serialize, Deserialize)]
struct RawBlock {
    id: BlockId,
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawBlock> for Block {
    fn from(mut raw: RawBlock) -> Self {
        let payload = raw.rest.remove(&raw.block_type);
        Self {
            id: raw.id,
            block_type: raw.block_type,
            payload,
            has_children: raw.has_children,
        }
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let mut rest = Map::new();
        rest.insert("object".to_string(), json!("block"));
        if let Some(payload) = block.payload {
            rest.insert(block.block_type.clone(), payload);
        }
        Self {
            id: block.id,
            block_type: block.block_type,
            has_children: block.has_children,
            rest,
        }
    }
}

impl Block {
    pub fn is_synced_block(&self) -> bool {
        self.block_type == SYNCED_BLOCK_TYPE
    }

    /// Literal content of the first rich-text run, `payload.rich_text[0].text.content`.
    pub fn leading_text(&self) -> Option<&str> {
        self.payload
            .as_ref()?
            .get("rich_text")?
            .get(0)?
            .get("text")?
            .get("content")?
            .as_str()
    }

    /// The block this synced block mirrors, when it is a reference rather than an origin.
    pub fn synced_from(&self) -> Option<BlockId> {
        if !self.is_synced_block() {
            return None;
        }
        let block_id = self
            .payload
            .as_ref()?
            .get("synced_from")?
            .get("block_id")?
            .clone();
        serde_json::from_value(block_id).ok()
    }

    /// A one-level copy of this block for an append-children request.
    ///
    /// Nested children are not carried over. Returns `None` when the block has
    /// no payload under its own type key.
    pub fn to_copy_request(&self) -> Option<Value> {
        let payload = self.payload.as_ref()?;
        let mut child = Map::new();
        child.insert("object".to_string(), json!("block"));
        child.insert("type".to_string(), json!(self.block_type));
        child.insert(self.block_type.clone(), payload.clone());
        Some(Value::Object(child))
    }
}

/// A new synced block that mirrors `origin`.
pub fn synced_reference(origin: &BlockId) -> Value {
    json!({
        "object": "block",
        "type": SYNCED_BLOCK_TYPE,
        SYNCED_BLOCK_TYPE: { "synced_from": { "block_id": origin } }
    })
}

/// A new, empty origin synced block.
pub fn synced_origin() -> Value {
    json!({
        "object": "block",
        "type": SYNCED_BLOCK_TYPE,
        SYNCED_BLOCK_TYPE: { "synced_from": null, "children": [] }
    })
}
