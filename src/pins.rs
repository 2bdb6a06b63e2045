//! GPIO / peripheral pin assignments for the test jig carrier board.
//!
//! Single source of truth for the carrier-board wiring. `main` claims every
//! pin by the number given here, so a GPIO must appear at most once.

// ---------------------------------------------------------------------------
// Mode buttons (active-low, internal pull-up)
// ---------------------------------------------------------------------------

pub const WIRE_TEST_BUTTON_GPIO: i32 = 1;
pub const CURRENT_TEST_BUTTON_GPIO: i32 = 2;
pub const CO2_TEST_BUTTON_GPIO: i32 = 42;
pub const LIGHT_TEST_BUTTON_GPIO: i32 = 41;

// ---------------------------------------------------------------------------
// Harness connector
// ---------------------------------------------------------------------------

/// Number of wire pairs on the harness connector.
pub const HARNESS_LINES: usize = 6;

/// Drive side: push-pull outputs, one per wire.
pub const DRIVE_LINE_GPIOS: [i32; HARNESS_LINES] = [4, 5, 6, 7, 15, 16];
/// Sense side: inputs with pull-down, index-matched with the drive side.
pub const SENSE_LINE_GPIOS: [i32; HARNESS_LINES] = [8, 9, 10, 11, 12, 13];

// ---------------------------------------------------------------------------
// I²C bus (INA226, SCD41, TSL2591, BME280)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 17;
pub const I2C_SCL_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// LEDs
// ---------------------------------------------------------------------------

/// Result indicator (discrete or common-cathode RGB).
pub const LED_R_GPIO: i32 = 38;
pub const LED_G_GPIO: i32 = 39;
pub const LED_B_GPIO: i32 = 40;

/// Power/heartbeat LED, always breathing while the jig is powered.
pub const HEARTBEAT_LED_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC frequency for the result indicator (1 kHz for smooth dimming).
pub const INDICATOR_PWM_FREQ_HZ: u32 = 1_000;
/// LEDC frequency for the heartbeat LED.
pub const HEARTBEAT_PWM_FREQ_HZ: u32 = 1_000;
