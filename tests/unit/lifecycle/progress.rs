use super::*;

fn channel() -> (Arc<watch::Sender<Option<String>>>, watch::Receiver<Option<String>>) {
    let (tx, rx) = watch::channel(None);
    (Arc::new(tx), rx)
}

#[tokio::test(start_paused = true)]
async fn rotates_through_messages_and_wraps() {
    let (tx, rx) = channel();
    let _ticker = ProgressTicker::start(ProgressPlan::video(Duration::from_secs(3)), tx);
    assert_eq!(rx.borrow().as_deref(), Some(VIDEO_LOADING_MESSAGES[0]));

    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert_eq!(rx.borrow().as_deref(), Some(VIDEO_LOADING_MESSAGES[1]));

    // Five more ticks wraps back to the first message.
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(rx.borrow().as_deref(), Some(VIDEO_LOADING_MESSAGES[0]));
}

#[tokio::test(start_paused = true)]
async fn drop_clears_message_and_stops_rotation() {
    let (tx, rx) = channel();
    let ticker = ProgressTicker::start(ProgressPlan::video(Duration::from_secs(3)), tx);
    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert!(rx.borrow().is_some());

    drop(ticker);
    assert_eq!(*rx.borrow(), None);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(*rx.borrow(), None);
}

#[tokio::test(start_paused = true)]
async fn single_message_plan_never_rotates() {
    let (tx, rx) = channel();
    let plan = ProgressPlan {
        messages: &["Working..."],
        interval: Duration::from_secs(1),
    };
    let _ticker = ProgressTicker::start(plan, tx);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(rx.borrow().as_deref(), Some("Working..."));
}
