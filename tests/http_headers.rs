use nestreq::config::RequestSpec;
use nestreq::http::{Request, StatusText};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_custom_headers_cookie_and_user_agent_sent() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/headers"))
        .and(header("X-Test-Header", "nestreq"))
        .and(header("Cookie", "session=abc"))
        .and(header("User-Agent", "nestreq-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::new(RequestSpec::get(format!("{}/headers", server.uri())), StatusText)
        .expect("request")
        .header("X-Test-Header", "nestreq")
        .header("Cookie", "overridden=1")
        .cookie("session=abc")
        .user_agent("nestreq-tests");

    assert_eq!(request.execute().await.expect("request should succeed"), "200");
}
