use crate::convert::background::PROXY_PREFIX;
use crate::error::Result;
use crate::export::descriptors::{Descriptor, DESCRIPTORS, STAGE_MODEL};
use crate::scene::SceneObject;

use super::{ObjectKind, StageObject};

/// Pick the descriptor and kind for an object name.
///
/// Descriptors are tried in priority order and the first match wins. Untagged objects with
/// geometry become static stage models; anything else untagged is not a stage object.
/// Background import proxies are never stage objects, whatever the imported entry was called.
pub fn classify(
    name: &str,
    has_geometry: bool,
) -> Result<Option<(&'static dyn Descriptor, ObjectKind)>> {
    if name.starts_with(PROXY_PREFIX) {
        return Ok(None);
    }
    if let Some(descriptor) = DESCRIPTORS.iter().copied().find(|d| d.matches(name)) {
        return Ok(Some((descriptor, descriptor.kind_for(name)?)));
    }
    if has_geometry {
        let descriptor: &'static dyn Descriptor = &STAGE_MODEL;
        return Ok(Some((descriptor, ObjectKind::StaticStageModel)));
    }
    Ok(None)
}

/// Classify a host object and parse its attributes into a [`StageObject`].
pub fn stage_object(object: &SceneObject) -> Result<Option<StageObject<'_>>> {
    let Some((descriptor, kind)) = classify(&object.name, object.data.has_geometry())? else {
        return Ok(None);
    };
    Ok(Some(StageObject {
        source: object,
        kind,
        descriptor,
        attributes: descriptor.parse_attributes(object, kind)?,
        link_target: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::stage::{BananaType, GoalColor, Playback};

    fn kind(name: &str, has_geometry: bool) -> Option<ObjectKind> {
        classify(name, has_geometry).unwrap().map(|(_, kind)| kind)
    }

    #[test]
    fn tags_map_to_kinds() {
        assert_eq!(Some(ObjectKind::ItemGroup), kind("[IG] Platform", true));
        assert_eq!(Some(ObjectKind::Goal(GoalColor::Red)), kind("[GOAL_R] Exit", false));
        assert_eq!(Some(ObjectKind::Banana(BananaType::Bunch)), kind("[BANANA_B]", false));
        assert_eq!(
            Some(ObjectKind::Switch(Playback::PlayBackwards)),
            kind("[SW_PLAY_BACKWARDS] Lever", false)
        );
        assert_eq!(Some(ObjectKind::Switch(Playback::Play)), kind("[SW_PLAY] Lever", false));
        assert_eq!(Some(ObjectKind::Wormhole), kind("[WH] Portal.001", false));
        assert_eq!(Some(ObjectKind::ConeCollision), kind("[CONE_COL] Spike", false));
        assert_eq!(Some(ObjectKind::TrackPath), kind("[PATH] Race", false));
        assert_eq!(Some(ObjectKind::ForegroundModel), kind("[FG] Clouds", true));
    }

    #[test]
    fn untagged_geometry_falls_back_to_stage_model() {
        assert_eq!(Some(ObjectKind::StaticStageModel), kind("Floor", true));
        assert_eq!(Some(ObjectKind::StaticStageModel), kind("[MODEL] Floor", true));
        assert_eq!(Some(ObjectKind::StaticStageModel), kind("Wall [NOCOLI]", true));
        assert_eq!(None, kind("Camera Target", false));
    }

    #[test]
    fn root_tags_only_match_as_prefix() {
        assert_eq!(Some(ObjectKind::Start), kind("[START] Player", false));
        assert_eq!(None, kind("Player [START]", false));
        assert_eq!(Some(ObjectKind::StaticStageModel), kind("Old [BG] mesh", true));
    }

    #[test]
    fn import_proxies_are_not_stage_objects() {
        assert_eq!(None, kind("[EXT_IMPORTED:[BUMPER]_Old:3]", false));
        assert_eq!(None, kind("[EXT_IMPORTED_FX:bg_sky:0:effectType2:1]", false));
    }

    #[test]
    fn priority_order_decides_overlaps() {
        // An item group named after a bumper is still an item group
        assert_eq!(Some(ObjectKind::ItemGroup), kind("[IG] [BUMPER] Holder", true));
        assert_eq!(Some(ObjectKind::Bumper), kind("[BUMPER] [MODEL] Knob", true));
    }

    #[test]
    fn unknown_switch_tag_is_an_error() {
        let err = classify("[SW_STOP] Lever", false).unwrap_err();
        assert!(matches!(err, ExportError::UnknownVariant { category: "switch", .. }));
        assert!(classify("[GOAL_Y] Exit", false).is_err());
    }

    #[test]
    fn stage_object_parses_attributes() {
        let mut object = SceneObject::new("[WH] Portal");
        object.properties.insert("whId", 12i64);
        let wormhole = stage_object(&object).unwrap().unwrap();
        assert_eq!(ObjectKind::Wormhole, wormhole.kind);
        assert!(matches!(
            wormhole.attributes,
            crate::stage::StageAttributes::Wormhole { wh_id: 12, .. }
        ));

        let missing = SceneObject::new("[WH] Unnumbered");
        assert!(matches!(
            stage_object(&missing),
            Err(ExportError::MissingAttribute { .. })
        ));
    }
}
