use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};

use crate::client::roster::models::roster_models::{AttendanceRecord, DataEnvelope, OneOrMany, Person};
use crate::logger;

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

pub async fn get_roster(
    client: &Client,
    url: &str,
    token: &str,
) -> Result<(StatusCode, Option<Vec<Person>>), reqwest::Error> {
    logger::info(format!("GET roster {}", url));

    let res = client
        .get(url)
        .headers(json_headers())
        .bearer_auth(token)
        .send()
        .await?;

    let status = res.status();

    if status == StatusCode::OK {
        let json = res.json::<DataEnvelope<OneOrMany<Person>>>().await?;
        Ok((status, Some(json.data.into_vec())))
    } else {
        Ok((status, None))
    }
}

pub async fn get_history(
    client: &Client,
    url: &str,
    token: &str,
) -> Result<(StatusCode, Option<Vec<AttendanceRecord>>), reqwest::Error> {
    logger::info(format!("GET history {}", url));

    let res = client
        .get(url)
        .headers(json_headers())
        .bearer_auth(token)
        .send()
        .await?;

    let status = res.status();

    if status == StatusCode::OK {
        let json = res.json::<DataEnvelope<Vec<AttendanceRecord>>>().await?;
        Ok((status, Some(json.data)))
    } else {
        Ok((status, None))
    }
}
