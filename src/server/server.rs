use super::bridge;
use super::dto::CreateTournament;
use super::dto::RegisterRequest;
use super::lobby::Lobby;
use crate::TournamentId;
use crate::UserId;
use crate::error::Error;
use crate::repo::Repository;
use crate::tournament::controller::Registrant;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run(repo: Arc<dyn Repository>, bind: String) -> Result<(), std::io::Error> {
        let state = web::Data::new(Lobby::new(repo));
        log::info!("starting tournament server on {}", bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(state.clone())
                .route("/tournaments", web::post().to(create))
                .route("/tournaments/{id}", web::get().to(status))
                .route(
                    "/tournaments/{id}/registration/open",
                    web::post().to(open_registration),
                )
                .route(
                    "/tournaments/{id}/registration/close",
                    web::post().to(close_registration),
                )
                .route("/tournaments/{id}/register", web::post().to(register))
                .route("/tournaments/{id}/unregister", web::post().to(unregister))
                .route("/tournaments/{id}/start", web::post().to(start))
                .route("/tournaments/{id}/cancel", web::post().to(cancel))
                .route("/tournaments/{id}/blinds/advance", web::post().to(advance))
                .route("/ws", web::get().to(connect))
        })
        .workers(4)
        .bind(bind)?
        .run()
        .await
    }
}

fn failure(e: Error) -> HttpResponse {
    let body = serde_json::json!({ "code": e.code(), "message": e.to_string() });
    match e {
        Error::NotFound => HttpResponse::NotFound().json(body),
        Error::AlreadyRegistered | Error::TournamentFull => HttpResponse::Conflict().json(body),
        Error::Transient(_) => HttpResponse::ServiceUnavailable().json(body),
        Error::Fatal(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

async fn create(lobby: web::Data<Lobby>, body: web::Json<CreateTournament>) -> impl Responder {
    match lobby.create(body.into_inner()).await {
        Ok(id) => HttpResponse::Ok().json(serde_json::json!({ "tournament_id": id })),
        Err(e) => failure(e),
    }
}

async fn status(lobby: web::Data<Lobby>, path: web::Path<TournamentId>) -> impl Responder {
    let id = path.into_inner();
    match lobby.controller(id).await {
        Ok(controller) => match controller.status().await {
            Ok(view) => HttpResponse::Ok().json(serde_json::json!({
                "id": view.tournament.id,
                "name": view.tournament.name,
                "status": view.tournament.status.as_str(),
                "current_blind_level": view.level,
                "remaining_players": view.remaining,
            })),
            Err(e) => failure(e),
        },
        Err(e) => failure(e),
    }
}

async fn open_registration(lobby: web::Data<Lobby>, path: web::Path<TournamentId>) -> impl Responder {
    act(lobby, path.into_inner(), |c| async move { c.open_registration().await }).await
}

async fn close_registration(lobby: web::Data<Lobby>, path: web::Path<TournamentId>) -> impl Responder {
    act(lobby, path.into_inner(), |c| async move { c.close_registration().await }).await
}

async fn start(lobby: web::Data<Lobby>, path: web::Path<TournamentId>) -> impl Responder {
    act(lobby, path.into_inner(), |c| async move { c.start().await }).await
}

async fn cancel(lobby: web::Data<Lobby>, path: web::Path<TournamentId>) -> impl Responder {
    let id = path.into_inner();
    let response = act(lobby.clone(), id, |c| async move { c.cancel().await }).await;
    lobby.drop_controller(id).await;
    response
}

async fn advance(lobby: web::Data<Lobby>, path: web::Path<TournamentId>) -> impl Responder {
    act(lobby, path.into_inner(), |c| async move { c.force_advance_blind().await }).await
}

async fn register(
    lobby: web::Data<Lobby>,
    path: web::Path<TournamentId>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let registrant = Registrant {
        user: request.user_id,
        name: request
            .display_name
            .unwrap_or_else(|| format!("player-{}", request.user_id)),
        bot: request.bot,
    };
    act(lobby, path.into_inner(), |c| async move { c.register(registrant).await }).await
}

async fn unregister(
    lobby: web::Data<Lobby>,
    path: web::Path<TournamentId>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    let user = body.user_id;
    act(lobby, path.into_inner(), |c| async move { c.unregister(user).await }).await
}

/// shared shape of the lifecycle endpoints
async fn act<F, Fut>(lobby: web::Data<Lobby>, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(crate::tournament::controller::ControllerHandle) -> Fut,
    Fut: std::future::Future<Output = crate::error::Result<()>>,
{
    match lobby.controller(id).await {
        Ok(controller) => match f(controller).await {
            Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
            Err(e) => failure(e),
        },
        Err(e) => failure(e),
    }
}

/// WebSocket upgrade; identity arrives as an opaque user id from the
/// (out of scope) auth layer
async fn connect(
    lobby: web::Data<Lobby>,
    req: HttpRequest,
    body: web::Payload,
    query: web::Query<ConnectQuery>,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            let session_id = lobby.next_session();
            bridge(lobby.registry(), session_id, query.user, session, stream);
            log::info!("session {} connected (user {:?})", session_id, query.user);
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

#[derive(serde::Deserialize)]
struct ConnectQuery {
    #[serde(default)]
    user: Option<UserId>,
}
