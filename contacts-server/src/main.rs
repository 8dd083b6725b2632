#[rocket::launch]
fn rocket() -> _ {
    contacts_server::init_logger();
    log::info!("starting contacts server");
    contacts_server::rocket()
}
