use aws_subnet_plan::config::GAP_CIDR_MASK;
use aws_subnet_plan::get_subnet_plan;
use aws_subnet_plan::output::{plan_print, plan_summary};
use aws_subnet_plan::processing::{free_offsets, get_az_layout, print_az_layout};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())?;
    dotenv::dotenv().ok();
    //
    log::info!("#Start main()");

    let config_file = std::env::args().nth(1);
    let plan = get_subnet_plan(config_file.as_deref())?;

    let layout = get_az_layout(&plan)?;
    print_az_layout(&plan, &layout)?;
    plan_print(&plan, GAP_CIDR_MASK)?;

    let free = free_offsets(plan.vpc_cidr, &plan.occupied_cidrs(), 4);
    println!("{}", plan_summary(&plan, &free));

    Ok(())
}
