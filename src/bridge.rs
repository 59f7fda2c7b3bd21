//! Host message bridge.
//!
//! Inbound commands arrive as JSON objects with a `type` discriminator and are
//! applied to a [`Session`] by [`dispatch`]. Outbound notifications are queued
//! on the session and delivered fire-and-forget by the embedding layer.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::CookingError;
use crate::recipe::{Recipe, lenient_catalog};
use crate::scheduler::Scheduler;
use crate::session::Session;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inbound {
    /// A missing or non-array `recipes` field keeps the current catalog.
    #[serde(alias = "openCooking")]
    Open {
        #[serde(default, deserialize_with = "lenient_catalog")]
        recipes: Option<Vec<Recipe>>,
    },
    UpdateRecipes {
        #[serde(default, deserialize_with = "lenient_catalog")]
        recipes: Option<Vec<Recipe>>,
    },
    #[serde(alias = "closeCooking")]
    Close,
    IngredientsReady,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    #[serde(rename_all = "camelCase")]
    StartCooking { recipe_id: String },
    CookingComplete {
        success: bool,
        recipe: String,
        result: Option<String>,
        quality: u8,
    },
    #[serde(rename = "closeUI")]
    CloseUi,
}

pub fn parse_inbound(raw: &str) -> Result<Inbound, CookingError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let kind = value.get("type").and_then(|t| t.as_str()).unwrap_or_default().to_string();
    let msg = Inbound::deserialize(value)?;
    if msg == Inbound::Unknown {
        info!("unknown message type '{}', ignoring", kind);
    } else {
        debug!("received '{}'", kind);
    }
    Ok(msg)
}

pub fn encode_outbound(msg: &Outbound) -> Result<String, CookingError> {
    Ok(serde_json::to_string(msg)?)
}

/// Applies one inbound command. Only `close` can fail (busy guard).
pub fn dispatch<S: Scheduler>(session: &mut Session<S>, msg: Inbound) -> Result<(), CookingError> {
    match msg {
        Inbound::Open { recipes } => session.open(recipes),
        Inbound::UpdateRecipes { recipes: Some(recipes) } => session.update_recipes(recipes),
        Inbound::UpdateRecipes { recipes: None } => debug!("updateRecipes without recipes, ignoring"),
        Inbound::Close => session.close_interface()?,
        Inbound::IngredientsReady => info!("ingredients ready"),
        Inbound::Unknown => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_inbound_shape() {
        let open = parse_inbound(r#"{"type":"open","recipes":[]}"#).unwrap();
        assert_eq!(open, Inbound::Open { recipes: Some(vec![]) });
        let legacy = parse_inbound(r#"{"type":"openCooking"}"#).unwrap();
        assert_eq!(legacy, Inbound::Open { recipes: None });
        assert_eq!(parse_inbound(r#"{"type":"close"}"#).unwrap(), Inbound::Close);
        assert_eq!(parse_inbound(r#"{"type":"closeCooking"}"#).unwrap(), Inbound::Close);
        assert_eq!(parse_inbound(r#"{"type":"ingredientsReady"}"#).unwrap(), Inbound::IngredientsReady);
        assert_eq!(parse_inbound(r#"{"type":"weather","rain":true}"#).unwrap(), Inbound::Unknown);
    }

    #[test]
    fn missing_type_is_a_decode_error() {
        assert!(matches!(parse_inbound(r#"{"recipes":[]}"#), Err(CookingError::Decode(_))));
        assert!(matches!(parse_inbound("not json"), Err(CookingError::Decode(_))));
    }

    #[test]
    fn outbound_wire_shapes() {
        let start = Outbound::StartCooking { recipe_id: "stew".into() };
        assert_eq!(encode_outbound(&start).unwrap(), r#"{"type":"startCooking","recipeId":"stew"}"#);

        let failed = Outbound::CookingComplete {
            success: false,
            recipe: "Stew".into(),
            result: None,
            quality: 12,
        };
        assert_eq!(
            encode_outbound(&failed).unwrap(),
            r#"{"type":"cookingComplete","success":false,"recipe":"Stew","result":null,"quality":12}"#
        );

        assert_eq!(encode_outbound(&Outbound::CloseUi).unwrap(), r#"{"type":"closeUI"}"#);
    }
}
