// UI layout hints per reading-strategy class.

use crate::types::*;

/// Layout hint for a classified strategy. Unknown keeps the current layout.
pub fn recommend(user_type: UserType) -> UiRecommendation {
    match user_type {
        UserType::Direct => UiRecommendation {
            layout: LayoutName::Focus,
            description: "Simplify the interface and emphasize the code editor".to_string(),
            components: PanelHints {
                task_panel: Some(PanelHint {
                    visible: true,
                    collapsed: Some(true),
                    split: None,
                }),
                output_panel: Some(PanelHint {
                    visible: false,
                    ..Default::default()
                }),
                contextual_links: false,
            },
        },
        UserType::Referential => UiRecommendation {
            layout: LayoutName::Balanced,
            description: "Keep the three-column layout so reference material stays visible"
                .to_string(),
            components: PanelHints {
                task_panel: Some(PanelHint {
                    visible: true,
                    collapsed: Some(false),
                    split: None,
                }),
                output_panel: Some(PanelHint {
                    visible: true,
                    collapsed: None,
                    split: Some(SplitDirection::Vertical),
                }),
                contextual_links: false,
            },
        },
        UserType::Exploratory => UiRecommendation {
            layout: LayoutName::Guided,
            description: "Offer more guidance and documentation links".to_string(),
            components: PanelHints {
                task_panel: Some(PanelHint {
                    visible: true,
                    collapsed: Some(false),
                    split: None,
                }),
                output_panel: Some(PanelHint {
                    visible: true,
                    collapsed: None,
                    split: Some(SplitDirection::Horizontal),
                }),
                contextual_links: true,
            },
        },
        UserType::Unknown => UiRecommendation {
            layout: LayoutName::Default,
            description: "Keep the current layout".to_string(),
            components: PanelHints::default(),
        },
    }
}
