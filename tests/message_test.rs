use crypto_chat::backend::to_wire_format;
use crypto_chat::message::{Message, Role};

// ============================================
// Role Tests
// ============================================

#[test]
fn test_role_labels() {
    assert_eq!(Role::User.label(), "You");
    assert_eq!(Role::System.label(), "Assistant");
}

#[test]
fn test_role_is_copy() {
    let role = Role::User;
    let role_copy = role; // Copy, not move
    assert_eq!(role, role_copy);
}

#[test]
fn test_role_equality() {
    assert_eq!(Role::User, Role::User);
    assert_eq!(Role::System, Role::System);
    assert_ne!(Role::User, Role::System);
}

// ============================================
// Message Tests
// ============================================

#[test]
fn test_message_user() {
    let msg = Message::user("Hello");
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.content, "Hello");
}

#[test]
fn test_message_system() {
    let msg = Message::system("Hi there");
    assert_eq!(msg.role, Role::System);
    assert_eq!(msg.content, "Hi there");
}

#[test]
fn test_message_accepts_string_and_str() {
    assert_eq!(Message::user("x"), Message::user(String::from("x")));
}

#[test]
fn test_message_empty_content_allowed() {
    let msg = Message::system("");
    assert!(msg.content.is_empty());
}

#[test]
fn test_message_clone_is_equal() {
    let msg = Message::new(Role::User, "what's btc worth");
    assert_eq!(msg.clone(), msg);
}

// ============================================
// Wire Format Tests
// ============================================

#[test]
fn test_wire_format_json_shape() {
    let wire = to_wire_format(&[Message::user("Hello!"), Message::system("Hi")]);
    let json = serde_json::to_string(&wire).unwrap();

    assert_eq!(
        json,
        r#"[{"role":{"user":null},"content":"Hello!"},{"role":{"system":null},"content":"Hi"}]"#
    );
}
