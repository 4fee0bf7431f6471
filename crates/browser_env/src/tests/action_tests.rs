use super::*;

#[test]
fn display_renders_id_based_grammar() {
    let action = Action::Type {
        element: ElementId(5),
        text: "hello".to_string(),
        press_enter: false,
    };
    assert_eq!(action.to_string(), "type [5] [hello] [0]");
    assert_eq!(Action::Click(ElementId(1757)).to_string(), "click [1757]");
    assert_eq!(Action::Scroll(ScrollDirection::Up).to_string(), "scroll [up]");
    assert_eq!(
        Action::Goto("http://homepage.com/password.html".to_string()).to_string(),
        "goto [http://homepage.com/password.html]"
    );
    assert_eq!(Action::Stop(String::new()).to_string(), "stop []");
    assert_eq!(Action::GoBack.to_string(), "go_back");
}

#[test]
fn scroll_direction_ignores_case_and_padding() {
    assert_eq!(ScrollDirection::parse(" Down "), Some(ScrollDirection::Down));
    assert_eq!(ScrollDirection::parse("UP"), Some(ScrollDirection::Up));
    assert_eq!(ScrollDirection::parse("sideways"), None);
}

#[test]
fn only_stop_ends_the_episode() {
    assert!(Action::Stop("done".to_string()).is_stop());
    assert!(!Action::GoBack.is_stop());
}

