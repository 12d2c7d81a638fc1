//! Property tests for controlled-section merging

use jobsync_core::XmlPatchMerger;
use proptest::prelude::*;

const TAGS: &[&str] = &["description", "scm"];

fn original(description: &str, keep: &str, node: &str) -> String {
    format!(
        "<project><description>{description}</description><keep>{keep}</keep>\
         <scm class=\"old\"/><assignedNode>{node}</assignedNode></project>"
    )
}

proptest! {
    #[test]
    fn patch_text_replaces_controlled_tag(
        old in "[a-zA-Z0-9 ]{0,24}",
        new in "[a-zA-Z0-9]{1,24}",
        keep in "[a-zA-Z0-9]{1,24}",
        node in "[a-z]{1,12}",
    ) {
        let patch = format!("<patch><description>{new}</description><scm class=\"new\"/></patch>");
        let merged = XmlPatchMerger::new().merge(&original(&old, &keep, &node), &patch, TAGS).unwrap();

        let expected = format!("<description>{new}</description>");
        prop_assert!(merged.contains(&expected));
        prop_assert_eq!(merged.matches("<description>").count(), 1);
        prop_assert!(merged.contains("<scm class=\"new\"/>"));
        let kept = format!("<keep>{keep}</keep>");
        let assigned = format!("<assignedNode>{node}</assignedNode>");
        prop_assert!(merged.contains(&kept));
        prop_assert!(merged.contains(&assigned));
    }

    #[test]
    fn merge_is_idempotent(
        new in "[a-zA-Z0-9]{1,24}",
        keep in "[a-zA-Z0-9]{1,24}",
    ) {
        let merger = XmlPatchMerger::new();
        let patch = format!("<patch><description>{new}</description></patch>");
        let once = merger.merge(&original("x", &keep, "n"), &patch, TAGS).unwrap();
        let twice = merger.merge(&once, &patch, TAGS).unwrap();
        prop_assert_eq!(once, twice);
    }
}
