use super::*;

const WINDOW: Duration = Duration::from_secs(3);

#[test]
fn test_first_value_passes_through() {
    let mut throttle = Throttle::new(WINDOW);
    let t0 = Instant::now();
    assert_eq!(throttle.push(1, t0), Some(1));
    assert!(!throttle.has_pending());
    assert_eq!(throttle.next_deadline(), None);
}

#[test]
fn test_latest_value_wins_inside_window() {
    let mut throttle = Throttle::new(WINDOW);
    let t0 = Instant::now();
    throttle.push(1, t0);

    assert_eq!(throttle.push(2, t0 + Duration::from_secs(1)), None);
    assert_eq!(throttle.push(3, t0 + Duration::from_secs(2)), None);
    assert_eq!(throttle.next_deadline(), Some(t0 + WINDOW));

    assert_eq!(throttle.poll(t0 + Duration::from_millis(2999)), None);
    assert_eq!(throttle.poll(t0 + WINDOW), Some(3));
    assert_eq!(throttle.poll(t0 + WINDOW * 2), None);
}

#[test]
fn test_window_restarts_after_release() {
    let mut throttle = Throttle::new(WINDOW);
    let t0 = Instant::now();
    throttle.push(1, t0);
    throttle.push(2, t0 + Duration::from_secs(1));
    let released_at = t0 + Duration::from_secs(4);
    assert_eq!(throttle.poll(released_at), Some(2));

    assert_eq!(throttle.push(3, released_at + Duration::from_secs(1)), None);
    assert_eq!(throttle.next_deadline(), Some(released_at + WINDOW));
}

#[test]
fn test_push_after_quiet_period_emits_immediately() {
    let mut throttle = Throttle::new(WINDOW);
    let t0 = Instant::now();
    throttle.push(1, t0);
    assert_eq!(throttle.push(2, t0 + Duration::from_secs(10)), Some(2));
}

#[test]
fn test_zero_interval_never_holds() {
    let mut throttle = Throttle::new(Duration::ZERO);
    let t0 = Instant::now();
    assert_eq!(throttle.push(1, t0), Some(1));
    assert_eq!(throttle.push(2, t0), Some(2));
}
