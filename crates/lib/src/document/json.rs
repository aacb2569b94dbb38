//! JSON import and export.

use base64ct::{Base64, Encoding};
use chrono::{DateTime, SecondsFormat};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use super::{Document, DocumentError};
use crate::{
    Result,
    change::{ChangeBuilder, ElemRef, Key, NewValue, ObjId, ObjType, Op, OpAction, OpId, ScalarValue},
    crdt::{Object, Value},
};

impl Document {
    /// Renders the whole document as JSON.
    ///
    /// Map keys come out sorted, so two converged replicas render identical
    /// output. Text renders as a string, a counter as its current sum, a
    /// timestamp as an RFC 3339 string, bytes as base64 and non-finite
    /// doubles as `null`.
    pub fn to_json(&self) -> JsonValue {
        self.object_json(ObjId::Root)
    }

    /// [`to_json`](Self::to_json) serialized to a string.
    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let json = self.to_json();
        let rendered = if pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        Ok(rendered)
    }

    /// Renders the value at `path` the way [`to_json`](Self::to_json) renders
    /// it inside the whole document.
    pub fn get_json(&self, path: &str) -> Result<JsonValue> {
        Ok(self.value_json(&self.get(path)?))
    }

    fn object_json(&self, obj: ObjId) -> JsonValue {
        match self.objects.get(&obj) {
            Some(Object::Map(map)) => JsonValue::Object(
                map.iter()
                    .filter_map(|(key, register)| {
                        let entry = register.winner()?;
                        Some((key.clone(), self.value_json(&Value::from_entry(entry))))
                    })
                    .collect::<JsonMap<_, _>>(),
            ),
            Some(Object::List(seq)) => JsonValue::Array(
                seq.visible()
                    .filter_map(|e| e.register.winner())
                    .map(|entry| self.value_json(&Value::from_entry(entry)))
                    .collect(),
            ),
            Some(Object::Text(_)) => JsonValue::String(self.text_content(obj).unwrap_or_default()),
            None => JsonValue::Null,
        }
    }

    fn value_json(&self, value: &Value) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(n) | Value::Counter(n) => JsonValue::Number((*n).into()),
            Value::Double(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::Bytes(bytes) => JsonValue::String(Base64::encode_string(bytes)),
            Value::Timestamp(millis) => DateTime::from_timestamp_millis(*millis).map_or_else(
                || JsonValue::Number((*millis).into()),
                |t| JsonValue::String(t.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
            Value::Map(obj) | Value::List(obj) | Value::Text(obj) => self.object_json(*obj),
        }
    }

    /// Builds a new document from a JSON object in a single change.
    ///
    /// Objects become maps, arrays become lists, strings become plain string
    /// values, integers become ints and other numbers doubles.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &JsonValue) -> Result<Self> {
        let JsonValue::Object(fields) = value else {
            return Err(DocumentError::type_mismatch("$", "object", json_type(value)).into());
        };
        let mut doc = Document::new();
        if fields.is_empty() {
            return Ok(doc);
        }
        let mut tx = doc.begin();
        for (key, field) in fields {
            push_json(&mut tx, ObjId::Root, Key::Map(key.clone()), false, field);
        }
        doc.commit(tx)?;
        Ok(doc)
    }
}

/// Records `value` at `key` of `obj`, recursing into containers.
fn push_json(
    tx: &mut ChangeBuilder,
    obj: ObjId,
    key: Key,
    insert: bool,
    value: &JsonValue,
) -> OpId {
    let new_value = match value {
        JsonValue::Object(_) => NewValue::Object(ObjType::Map),
        JsonValue::Array(_) => NewValue::Object(ObjType::List),
        scalar => NewValue::Scalar(json_scalar(scalar)),
    };
    let action = if insert {
        OpAction::Insert(new_value)
    } else {
        OpAction::Put(new_value)
    };
    let id = tx.push(Op {
        obj,
        key,
        action,
        pred: vec![],
    });

    match value {
        JsonValue::Object(fields) => {
            for (field, child) in fields {
                push_json(tx, ObjId::Op(id), Key::Map(field.clone()), false, child);
            }
        }
        JsonValue::Array(items) => {
            let mut after = ElemRef::Head;
            for item in items {
                let elem = push_json(tx, ObjId::Op(id), Key::Seq(after), true, item);
                after = ElemRef::Elem(elem);
            }
        }
        _ => {}
    }
    id
}

fn json_scalar(value: &JsonValue) -> ScalarValue {
    match value {
        JsonValue::Bool(b) => ScalarValue::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => ScalarValue::Int(i),
            None => ScalarValue::F64(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => ScalarValue::Str(s.clone()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => ScalarValue::Null,
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
