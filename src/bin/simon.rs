//! Simon firmware: game, display refresh and buzzer as three embassy tasks.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::{
    gpio::Output,
    timer::timg::TimerGroup,
};
use esp_println as _;
use rand::{
    SeedableRng,
    rngs::SmallRng,
};
use segment_simon::{
    DisplayBus,
    DisplayTask,
    Game,
    GameConfig,
    SharedState,
    board::{
        self,
        BoardDisplayBus,
        BoardDisplayTask,
        BoardGame,
        BoardShared,
        Buzzer,
        BuzzerChannel,
    },
    mk_static,
    split_resources,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

static SHARED: BoardShared = SharedState::new();
static BUZZER: BuzzerChannel = BuzzerChannel::new();

#[embassy_executor::task]
async fn game_task(game: &'static mut BoardGame) {
    game.run().await
}

#[embassy_executor::task]
async fn display_task(display: &'static mut BoardDisplayTask) {
    display.run().await
}

#[embassy_executor::task]
async fn buzzer_task(pin: Output<'static>) {
    board::buzzer::run(pin, &BUZZER).await
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = board::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 16 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let rng = esp_hal::rng::Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());
    info!("pattern seed {=u64:x}", seed);

    let config = GameConfig::default();
    let bus = mk_static!(
        BoardDisplayBus,
        DisplayBus::new(board::segment_display(resources.display, config.bit_order))
    );
    let display = mk_static!(
        BoardDisplayTask,
        DisplayTask::new(bus, &SHARED, embassy_time::Delay, config.timing)
    );
    let game = mk_static!(
        BoardGame,
        Game::new(
            &SHARED,
            bus,
            resources.leds.into(),
            resources.buttons.into(),
            Buzzer::new(&BUZZER),
            SmallRng::seed_from_u64(seed),
            embassy_time::Delay,
        )
        .with_config(config)
    );

    spawner.must_spawn(buzzer_task(resources.buzzer.into()));
    spawner.must_spawn(display_task(display));
    spawner.must_spawn(game_task(game));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
