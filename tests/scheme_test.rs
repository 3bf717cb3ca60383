use campus_jukebox::pages;
use campus_jukebox::scheme::TimeLabel;
use std::collections::HashSet;

#[test]
fn every_hour_maps_to_exactly_one_label() {
    for hour in 0..24 {
        let label = TimeLabel::from_hour(hour);
        let known = matches!(
            label,
            TimeLabel::Morning | TimeLabel::Day | TimeLabel::Evening | TimeLabel::Night
        );
        assert!(known, "hour {} produced no label", hour);
    }
}

#[test]
fn boundary_hours_map_to_expected_labels() {
    let expected = [
        (4, TimeLabel::Night),
        (5, TimeLabel::Morning),
        (11, TimeLabel::Morning),
        (12, TimeLabel::Day),
        (16, TimeLabel::Day),
        (17, TimeLabel::Evening),
        (20, TimeLabel::Evening),
        (21, TimeLabel::Night),
        (0, TimeLabel::Night),
        (23, TimeLabel::Night),
    ];

    for (hour, label) in expected {
        assert_eq!(
            TimeLabel::from_hour(hour),
            label,
            "hour {} should map to {}",
            hour,
            label
        );
    }
}

#[test]
fn mapping_is_deterministic() {
    for hour in 0..24 {
        assert_eq!(TimeLabel::from_hour(hour), TimeLabel::from_hour(hour));
    }
}

#[test]
fn css_classes_cover_the_four_labels() {
    let classes: Vec<&str> = (0..24)
        .map(|h| TimeLabel::from_hour(h).css_class())
        .collect();
    for class in &classes {
        assert!(["morning", "day", "evening", "night"].contains(class));
    }
    assert!(classes.contains(&"morning"));
    assert!(classes.contains(&"day"));
    assert!(classes.contains(&"evening"));
    assert!(classes.contains(&"night"));
}

/// Rendering replaces the body class wholesale, so rendering twice with the
/// same label yields the same single class (no accumulation of old classes).
#[test]
fn body_carries_the_label_as_its_only_class() {
    let voted = HashSet::new();

    let first = pages::board_page(TimeLabel::Evening, "tester", &[], &voted);
    let second = pages::board_page(TimeLabel::Evening, "tester", &[], &voted);
    assert_eq!(first, second);

    assert!(first.contains(r#"<body class="evening">"#));
    assert_eq!(first.matches("<body").count(), 1);

    let login = pages::login_page(TimeLabel::Night, "");
    assert!(login.contains(r#"<body class="night">"#));
}
