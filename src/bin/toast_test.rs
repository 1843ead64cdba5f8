use portal::toast::{ToastKind, ToastQueue};
use std::time::Duration;

#[tokio::main]
async fn main() {
    println!("\n====== Testing show ordering ======");
    let queue = ToastQueue::new();
    queue.show("Saved", ToastKind::Success, 300);
    queue.show("Network error", ToastKind::Error, 300);

    let active = queue.active();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].message, "Saved");
    assert_eq!(active[0].kind, ToastKind::Success);
    assert_eq!(active[1].message, "Network error");
    assert_eq!(active[1].kind, ToastKind::Error);
    println!("✓ two toasts active in insertion order");

    println!("\n====== Testing auto-expiry ======");
    tokio::time::sleep(Duration::from_millis(450)).await;
    assert!(queue.is_empty());
    println!("✓ both toasts expired on their own");

    println!("\n====== Testing dismissal ordering ======");
    let a = queue.show("a", ToastKind::Info, 0);
    let b = queue.show("b", ToastKind::Info, 0);
    let c = queue.show("c", ToastKind::Info, 0);
    assert!(queue.dismiss(b));
    let remaining: Vec<u64> = queue.active().iter().map(|t| t.id).collect();
    assert_eq!(remaining, vec![a, c]);
    println!("✓ dismissing the middle toast keeps [a, c]");

    println!("\n====== Testing idempotent dismissal ======");
    assert!(!queue.dismiss(b));
    assert_eq!(queue.len(), 2);
    println!("✓ second dismissal is a no-op");

    println!("\n====== Testing early dismissal cancels the timer ======");
    let d = queue.show("short-lived", ToastKind::Success, 200);
    assert!(queue.dismiss(d));
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(queue.len(), 2);
    println!("✓ aborted timer left the other toasts alone");

    println!("\n====== Testing teardown ======");
    queue.show("doomed", ToastKind::Info, 200);
    queue.clear();
    assert!(queue.is_empty());
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(queue.is_empty());
    println!("✓ clear cancelled every pending removal");

    println!("\nAll tests completed.");
}
