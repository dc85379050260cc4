use linkmate_host::frame_io::{read_frame, write_frame};
use linkmate_host::host::Host;
use linkmate_protocol::HostMessage;
use serde_json::json;

fn sync_message(account: &str, timestamp: i64, tabs: usize) -> serde_json::Value {
	let tabs: Vec<_> = (0..tabs)
		.map(|i| json!({"tabId": i, "title": format!("Tab {i}"), "url": format!("https://example.com/{i}")}))
		.collect();
	json!({
		"type": "TABS_SYNC",
		"browser": "chrome",
		"accountId": account,
		"profileName": "chrome",
		"timestamp": timestamp,
		"data": {"tabs": tabs, "groups": []}
	})
}

async fn next_reply(reader: &mut tokio::io::DuplexStream) -> HostMessage {
	let body = read_frame(reader).await.unwrap().expect("reply frame");
	serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn acknowledges_and_orders_snapshots() {
	let (mut browser_out, host_in) = tokio::io::duplex(64 * 1024);
	let (host_out, mut browser_in) = tokio::io::duplex(64 * 1024);
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("tabs.json");

	let out = path.clone();
	let server = tokio::spawn(async move {
		let mut host = Host::new(Some(out));
		let result = host.serve(host_in, host_out).await;
		result.map(|()| host)
	});

	write_frame(&mut browser_out, &sync_message("Profile-1111", 200, 2)).await.unwrap();
	assert_eq!(
		next_reply(&mut browser_in).await,
		HostMessage::SyncAck {
			timestamp: 200,
			tabs: 2,
			groups: 0,
			applied: true
		}
	);

	write_frame(&mut browser_out, &sync_message("Profile-1111", 100, 5)).await.unwrap();
	let HostMessage::SyncAck { applied, .. } = next_reply(&mut browser_in).await else {
		panic!("expected ack");
	};
	assert!(!applied);

	drop(browser_out);
	let host = server.await.unwrap().unwrap();
	assert_eq!(host.received(), 2);
	assert_eq!(host.snapshots().get("Profile-1111").unwrap().timestamp, 200);

	let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
	assert_eq!(saved["Profile-1111"]["data"]["tabs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn rejects_undecodable_messages_and_keeps_serving() {
	let (mut browser_out, host_in) = tokio::io::duplex(64 * 1024);
	let (host_out, mut browser_in) = tokio::io::duplex(64 * 1024);

	let server = tokio::spawn(async move {
		let mut host = Host::new(None);
		let result = host.serve(host_in, host_out).await;
		result.map(|()| host)
	});

	write_frame(&mut browser_out, &json!({"type": "PING"})).await.unwrap();
	assert!(matches!(next_reply(&mut browser_in).await, HostMessage::Rejected { .. }));

	write_frame(&mut browser_out, &sync_message("id-abcdefghi", 1, 1)).await.unwrap();
	assert!(matches!(
		next_reply(&mut browser_in).await,
		HostMessage::SyncAck { applied: true, .. }
	));

	drop(browser_out);
	let host = server.await.unwrap().unwrap();
	assert_eq!(host.received(), 2);
	assert_eq!(host.snapshots().len(), 1);
}

#[tokio::test]
async fn broken_framing_ends_the_loop_with_an_error() {
	use tokio::io::AsyncWriteExt;

	let (mut browser_out, host_in) = tokio::io::duplex(1024);
	let (host_out, _browser_in) = tokio::io::duplex(1024);

	browser_out.write_all(&[0xff, 0xff]).await.unwrap();
	drop(browser_out);

	let mut host = Host::new(None);
	assert!(host.serve(host_in, host_out).await.is_err());
}
