//! Escalation and network retries of the message sender.

mod common;

use std::time::Duration;

use common::{Harness, token_page};
use vbchat::fake::{FakeReply, FakeTransport};
use vbchat::protocol::Endpoint;
use vbchat::{Error, SendReport};

fn forum() -> FakeTransport {
	FakeTransport::new()
		.respond(Endpoint::Login, FakeReply::ok("").with_cookie("bbsessionhash=s1; path=/"))
		.respond(Endpoint::FaqPage, FakeReply::ok(token_page("tok")))
}

#[tokio::test]
async fn accepted_post_needs_no_recovery() {
	let harness = Harness::new(forum().respond(Endpoint::Post, FakeReply::ok("")));
	harness.session.refresh_token().await.unwrap();

	let report = harness.sender(5).send("hello").await.unwrap();

	assert_eq!(
		report,
		SendReport {
			attempts: 1,
			token_refreshes: 0,
			relogins: 0
		}
	);
	let post = harness.transport.requests().pop().unwrap();
	assert_eq!(post.body.as_deref(), Some("do=cb_postnew&securitytoken=tok&vsacb_newmessage=hello"));
	assert!(!post.keep_alive);
}

#[tokio::test]
async fn two_rejections_recover_by_refresh_then_relogin() {
	let transport = forum()
		.script(Endpoint::Post, [FakeReply::status(200, "invalid token"), FakeReply::status(403, "")])
		.respond(Endpoint::Post, FakeReply::ok(""));
	let harness = Harness::new(transport);
	harness.session.refresh_token().await.unwrap();
	let token_fetches_before = harness.transport.count(Endpoint::FaqPage);

	let report = harness.sender(5).send("hi").await.unwrap();

	assert_eq!(report.attempts, 3);
	assert_eq!(report.token_refreshes, 1);
	assert_eq!(report.relogins, 1);
	assert_eq!(harness.transport.count(Endpoint::Post), 3);
	assert_eq!(harness.transport.count(Endpoint::Login), 1);
	// one refresh on its own, one as part of the relogin
	assert_eq!(harness.transport.count(Endpoint::FaqPage) - token_fetches_before, 2);
}

#[tokio::test]
async fn always_failing_posts_give_up_after_three_attempts() {
	let harness = Harness::new(forum().respond(Endpoint::Post, FakeReply::status(500, "")));
	harness.session.refresh_token().await.unwrap();

	let err = harness.sender(5).send("hi").await.unwrap_err();

	assert!(matches!(err, Error::SendRejected { status: 500, .. }), "unexpected error: {err:?}");
	assert_eq!(harness.transport.count(Endpoint::Post), 3);

	tokio::time::sleep(Duration::from_millis(20)).await;
	assert_eq!(harness.transport.count(Endpoint::Post), 3);
	assert_eq!(harness.transport.count(Endpoint::Login), 1);
}

#[tokio::test]
async fn network_failures_are_retried_without_touching_the_session() {
	let transport = forum()
		.script(Endpoint::Post, std::iter::repeat_n(FakeReply::network_error(), 3))
		.script(Endpoint::Post, [FakeReply::Timeout])
		.respond(Endpoint::Post, FakeReply::ok(""));
	let harness = Harness::new(transport);
	harness.session.refresh_token().await.unwrap();

	let report = harness.sender(5).send("hi").await.unwrap();

	assert_eq!(report.attempts, 1);
	assert_eq!(harness.transport.count(Endpoint::Post), 5);
	assert_eq!(harness.transport.count(Endpoint::Login), 0);
	assert_eq!(harness.transport.count(Endpoint::FaqPage), 1);
}

#[tokio::test]
async fn network_retries_stop_at_the_cap() {
	let harness = Harness::new(forum().respond(Endpoint::Post, FakeReply::network_error()));
	harness.session.refresh_token().await.unwrap();

	let err = harness.sender(5).send("hi").await.unwrap_err();

	assert!(err.is_network());
	assert_eq!(harness.transport.count(Endpoint::Post), 5);
	assert_eq!(harness.transport.count(Endpoint::Login), 0);
}

#[tokio::test]
async fn stale_token_is_refreshed_before_posting() {
	let transport = forum()
		.script(Endpoint::FaqPage, [FakeReply::ok(token_page("old")), FakeReply::ok(token_page("new"))])
		.respond(Endpoint::Post, FakeReply::ok(""));
	let harness = Harness::new(transport);
	harness.session.refresh_token().await.unwrap();
	harness.session.login().await.unwrap();
	assert_eq!(harness.session.current_token(), None);

	harness.sender(5).send("x").await.unwrap();

	let post = harness.transport.requests().pop().unwrap();
	assert!(post.body.unwrap().contains("securitytoken=new"));
}

#[tokio::test]
async fn missing_token_during_recovery_aborts_the_send() {
	let transport = forum()
		.script(Endpoint::FaqPage, [FakeReply::ok(token_page("tok"))])
		.respond(Endpoint::FaqPage, FakeReply::ok("<html>maintenance</html>"))
		.respond(Endpoint::Post, FakeReply::status(200, "error"));
	let harness = Harness::new(transport);
	harness.session.refresh_token().await.unwrap();

	let err = harness.sender(5).send("hi").await.unwrap_err();

	assert!(matches!(err, Error::ProtocolViolation(_)));
	assert_eq!(harness.transport.count(Endpoint::Post), 1);
	assert_eq!(harness.session.current_token().as_deref(), Some("tok"));
}

#[tokio::test]
async fn accepted_post_pokes_the_poller() {
	let harness = Harness::new(forum().respond(Endpoint::Post, FakeReply::ok("")));
	harness.session.refresh_token().await.unwrap();
	harness.sender(5).send("hi").await.unwrap();

	let control = harness.control.clone();
	tokio::time::timeout(Duration::from_secs(1), async move {
		// the stored wake-up makes a fresh poller skip its first sleep
		let mut poller = harness.poller(Duration::from_secs(60));
		harness.transport.set_reply(Endpoint::Messages, FakeReply::ok(""));
		let run = tokio::spawn(async move { poller.run().await });
		while harness.transport.count(Endpoint::Messages) < 2 {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
		control.stop();
		run.await.unwrap();
	})
	.await
	.expect("poke should cut the first sleep short");
}

#[tokio::test]
async fn stopping_ends_network_retries() {
	let harness = Harness::new(forum().respond(Endpoint::Post, FakeReply::network_error()));
	harness.session.refresh_token().await.unwrap();
	harness.control.stop();

	let err = harness.sender(5).send("hi").await.unwrap_err();

	assert!(matches!(err, Error::Stopped));
	assert_eq!(harness.transport.count(Endpoint::Post), 1);
}
